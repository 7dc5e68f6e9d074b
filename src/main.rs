// Wed Feb 04 2026 - Alex

use std::process::ExitCode;

fn main() -> ExitCode {
    shardprep::ui::cli::run()
}
