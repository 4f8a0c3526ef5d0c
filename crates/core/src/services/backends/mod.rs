pub mod file_magic;
pub mod signature;
pub mod sleuthkit;

pub use file_magic::FileCommandSniffer;
pub use signature::SignatureSniffer;
pub use sleuthkit::SleuthKit;
