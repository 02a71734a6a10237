pub mod error;
pub mod instance;

pub use error::{Error, Record};
pub use instance::{Instance, InstanceParts, ReadOptions};

use std::fs::read_to_string;
use std::path::Path;

/// Reads the instance stored at `path`, keeping cost rows as they are.
pub fn read_instance<P: AsRef<Path>>(path: P) -> Result<Instance, Error> {
    InstanceReader::default().read(path)
}

/// Loader of instance files with fixed [`ReadOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceReader {
    options: ReadOptions,
}

impl InstanceReader {
    pub fn with_options(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Instance, Error> {
        let f = read_to_string(path)?;

        Instance::parse_with(&f, &self.options)
    }
}
