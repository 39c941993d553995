//! # skiff-vfs
//!
//! The data model shared by the bundle and type-check pipelines: an
//! in-memory project ([`VirtualFileMap`]), the import resolution policy
//! ([`Resolver`]) and content loading with extension probing ([`load`]).
//!
//! ```
//! use skiff_vfs::{Resolver, ResolvedReference, VirtualFileMap, load};
//!
//! let files = VirtualFileMap::from_entries([
//!     ("src/main.tsx", "import './a'"),
//!     ("src/a.ts", "export const x = 1"),
//! ])?;
//! let resolver = Resolver::new("src/main.tsx");
//!
//! let ResolvedReference::VirtualKey(key) = resolver.resolve("./a", Some("src/main.tsx")) else {
//!     unreachable!()
//! };
//! assert_eq!(load(&key, &files)?.key, "src/a.ts");
//! # Ok::<(), skiff_vfs::VfsError>(())
//! ```

pub mod error;
pub mod files;
pub mod loader;
pub mod resolve;

pub use error::VfsError;
pub use files::{MAX_FILE_SIZE, MAX_PATH_LEN, VirtualFileMap, normalize, validate_key};
pub use loader::{LoadedFile, LoaderKind, PROBE_EXTENSIONS, load, probe};
pub use resolve::{
    ALIAS_PREFIX, ExternalSet, RUNTIME_EXTERNALS, ResolvedReference, Resolver, SOURCE_ROOT,
    is_stylesheet,
};

pub type Result<T> = std::result::Result<T, VfsError>;
