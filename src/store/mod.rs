/// Sends a formatted message to a driver `Sink`, stamped with the calling
/// module's path.
macro_rules! emit {
    ($sink:expr, $level:expr, $($arg:tt)+) => {
        $sink.emit($level, module_path!(), format_args!($($arg)+))
    };
}

mod codec;
mod driver;
mod locks;
mod options;
mod paths;

pub use codec::{decode, encode};
pub use driver::Driver;
pub use locks::{CollectionLock, LockRegistry};
pub use options::Options;
pub use paths::{Located, PathResolver};
