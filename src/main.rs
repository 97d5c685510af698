mod app;
mod entry;
mod system;

use barrage::{args, config, dispatcher, error, http};
use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
