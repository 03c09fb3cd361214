//! Checks that run over a decoded [`ClassFile`]. Both passes only borrow the class file, so
//! running them again gives the same answer.

mod references;
mod structure;

pub use self::references::validate_references;
pub use self::structure::validate_structure;

use crate::{ClassFile, Result};

/// Runs the reference checks, then the structure checks, stopping at the first failure.
pub fn validate(class_file: &ClassFile) -> Result<()> {
    log::debug!(
        "Validating class file {} with {} constant pool entries",
        class_file.version,
        class_file.constant_pool.count()
    );

    validate_references(class_file)?;
    validate_structure(class_file)
}
