use super::Host;
use super::common::CacheDirArgs;
use crate::Result;
use crate::facts::{MetricsCache, acquire_cache_lock};
use clap::{Args, Subcommand};
use std::io::Write;

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show where the cache lives and how large it is
    Info(CacheDirArgs),
    /// Delete every cached metrics entry
    Clear(CacheDirArgs),
}

pub async fn cache<H: Host>(host: &mut H, args: &CacheArgs) -> Result<()> {
    match &args.command {
        CacheCommand::Info(dir_args) => {
            let dir = dir_args.resolve()?;
            let info = MetricsCache::new(&dir).info()?;
            let mut out = host.output();
            let _ = writeln!(out, "Cache directory : {}", dir.display());
            let _ = writeln!(out, "Entries         : {}", info.entry_count);
            let _ = writeln!(out, "Size            : {} bytes", info.total_bytes);
        }
        CacheCommand::Clear(dir_args) => {
            let dir = dir_args.resolve()?;
            let _lock = acquire_cache_lock(&dir).await?;
            let removed = MetricsCache::new(&dir).clear()?;
            let _ = writeln!(
                host.output(),
                "Removed {} entries ({} bytes) from {}",
                removed.entry_count,
                removed.total_bytes,
                dir.display()
            );
        }
    }

    Ok(())
}
