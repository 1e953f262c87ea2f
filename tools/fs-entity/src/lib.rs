pub mod camera_info;
pub mod collection;
pub mod content_type;
pub mod entity;
pub mod path_entity;
pub mod tree;

pub use camera_info::CameraInfo;
pub use collection::{EntityCollection, Entry};
pub use content_type::{ContentTypes, DEFAULT_CONTENT_TYPE};
pub use entity::{
    DirectoryEntity, Entity, EntityError, FileEntity, FileMutator, Mutator, Owner, Result,
    DEFAULT_DIRECTORY_MODE, DEFAULT_FILE_MODE,
};
pub use path_entity::PathEntity;
pub use tree::{TreeWalker, WalkFailure, WalkMode, WalkOptions, WalkReport, WalkStep};
