//! SIGINT / SIGTERM → [`CancelToken`].
//!
//! The first signal sets the token and the loop winds down at its next
//! check.  A second signal while the flag is already set exits at once,
//! so blocking phases such as the broker connect can still be
//! interrupted.

use std::io;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::app::cancel::CancelToken;

/// Exit status used when a repeated signal forces shutdown.
const FORCED_EXIT_CODE: i32 = 1;

pub fn install(cancel: &CancelToken) -> io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        // Order matters: the shutdown check must see the flag before this
        // signal sets it.
        flag::register_conditional_shutdown(signal, FORCED_EXIT_CODE, cancel.flag())?;
        flag::register(signal, cancel.flag())?;
    }
    Ok(())
}
