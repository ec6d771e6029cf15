#![warn(clippy::all)]

use std::process;

use structopt::StructOpt;

use cfsubmit::{Console, Opt, Result};

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let cnsl = &mut Console::term(opt.console_config());
    if !opt.run(cnsl)? {
        process::exit(1);
    }
    Ok(())
}
