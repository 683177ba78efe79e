mod discard;
mod exec;
mod multi;
mod watch;

pub use discard::{DiscardArguments, discard};
pub use exec::{ExecArguments, exec, run_transaction_commands};
pub use multi::{MultiArguments, multi};
pub use watch::{UnwatchArguments, WatchArguments, unwatch, watch};
