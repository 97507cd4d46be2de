// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod class_file;
pub mod constant_pool;
pub mod cursor;
mod editor;
mod error;
pub mod format;
mod parser;
pub mod version;

pub use self::class_file::{ClassFile, ClassFileHeader};
pub use constant_pool::ConstantPool;
pub use editor::Editor;
pub use error::ClassFileError;
pub use format::DisplayFlags;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
