use super::Host;
use crate::input::Format;
use std::io::Write;
use strum::IntoEnumIterator;

/// List the manifest formats `analyze` understands.
pub fn list_formats<H: Host>(host: &mut H) {
    let mut out = host.output();
    for format in Format::iter() {
        let name: &'static str = format.into();
        let _ = writeln!(out, "{name:<14}{}", format.description());
    }
}
