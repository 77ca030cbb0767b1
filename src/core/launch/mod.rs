pub mod arguments;
pub mod classpath;
pub mod natives;
pub mod resolver;

pub use arguments::{resolve_arguments, substitute};
pub use classpath::build_classpath;
pub use natives::{cleanup_natives, extract_natives};
pub use resolver::{
    resolve, select_libraries, LaunchResolver, Resolution, ResolvedLaunch, ResolvedLibrary,
};
