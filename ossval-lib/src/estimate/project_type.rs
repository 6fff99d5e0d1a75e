use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Category of a project, which drives the expertise premium in the cost model.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ProjectType {
    Script,
    #[default]
    Library,
    Framework,
    Compiler,
    Database,
    OperatingSystem,
    Cryptography,
    MachineLearning,
    Networking,
    Embedded,
    Graphics,
    Scientific,
    Devtools,
}

/// Keywords in package names and repository paths that suggest a category.
///
/// Keywords of five or more characters also match inside a longer word, so `torch`
/// matches `pytorch`. Shorter ones must match a whole word.
const KEYWORDS: &[(ProjectType, &[&str])] = &[
    (
        ProjectType::Framework,
        &[
            "react", "vue", "angular", "svelte", "django", "flask", "fastapi", "rails", "express", "spring", "laravel", "nextjs", "framework",
        ],
    ),
    (
        ProjectType::Compiler,
        &["babel", "llvm", "gcc", "clang", "compiler", "typescript", "swc", "esbuild", "rustc", "cranelift", "interpreter"],
    ),
    (
        ProjectType::Database,
        &[
            "redis", "postgres", "mysql", "sqlite", "mongo", "cassandra", "rocksdb", "leveldb", "database", "elasticsearch", "sled", "duckdb",
        ],
    ),
    (ProjectType::OperatingSystem, &["kernel", "linux", "freebsd", "hypervisor", "bootloader"]),
    (
        ProjectType::Cryptography,
        &["openssl", "crypto", "ring", "rustls", "bcrypt", "sodium", "tls", "ssl", "cipher", "sha2", "ed25519"],
    ),
    (
        ProjectType::MachineLearning,
        &["tensorflow", "torch", "keras", "sklearn", "scikit", "transformers", "xgboost", "onnx", "lightgbm", "jax"],
    ),
    (
        ProjectType::Networking,
        &["http", "hyper", "tokio", "netty", "nginx", "grpc", "socket", "requests", "curl", "network", "websocket", "axios"],
    ),
    (ProjectType::Embedded, &["embedded", "firmware", "arduino", "rtos", "hal", "microcontroller", "stm32"]),
    (
        ProjectType::Graphics,
        &["opengl", "vulkan", "graphics", "render", "wgpu", "three", "webgl", "skia", "shader"],
    ),
    (
        ProjectType::Scientific,
        &["numpy", "scipy", "pandas", "matplotlib", "sympy", "scientific", "numerical", "ndarray", "statsmodels"],
    ),
    (
        ProjectType::Devtools,
        &["lint", "eslint", "prettier", "clippy", "pytest", "jest", "webpack", "formatter", "debugger", "black", "ruff"],
    ),
    (ProjectType::Script, &["script", "scripts", "dotfiles"]),
];

/// Result of categorizing a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub project_type: ProjectType,

    /// Keywords that selected the category. Empty when nothing matched.
    pub keywords: Vec<&'static str>,
}

fn matches(word: &str, keyword: &str) -> bool {
    word == keyword || (keyword.len() >= 5 && word.contains(keyword))
}

impl ProjectType {
    /// Guess a category from a package name and optional repository URL.
    ///
    /// The category with the most matching keywords wins, earlier categories breaking
    /// ties. Falls back to [`ProjectType::Library`].
    #[must_use]
    pub fn detect(name: &str, repository: Option<&url::Url>) -> Detection {
        let mut text = name.to_lowercase();
        if let Some(url) = repository {
            text.push(' ');
            text.push_str(&url.path().to_lowercase());
        }

        let words: Vec<&str> = text.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()).collect();

        let mut best = Detection {
            project_type: Self::Library,
            keywords: Vec::new(),
        };

        for (project_type, keywords) in KEYWORDS {
            let found: Vec<&'static str> = keywords
                .iter()
                .copied()
                .filter(|kw| words.iter().any(|w| matches(w, kw)))
                .collect();

            if found.len() > best.keywords.len() {
                best = Detection {
                    project_type: *project_type,
                    keywords: found,
                };
            }
        }

        best
    }
}
