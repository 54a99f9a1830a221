pub mod anchors;
pub mod assets;
pub mod builder;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod markdown;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod scanner;
pub mod topics;
pub mod wordcount;

// Re-export main types
pub use builder::{BuildError, Builder};
pub use config::{Config, ConfigError};
pub use model::{MonthGroup, NavItem, Page, Post, Site, Topic, YearGroup};
pub use renderer::{Renderer, TemplateError};
pub use scanner::{ScanError, scan_content};
