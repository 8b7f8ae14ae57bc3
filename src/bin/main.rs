extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate picklist;
extern crate shlex;

use std::env;
use std::io::{IsTerminal, Write};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use picklist::prelude::*;
use picklist::util::read_file_lines;

//------------------------------------------------------------------------------
fn main() {
    env_logger::builder().format_timestamp_nanos().init();

    match real_main() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            // if downstream pipe is closed, exit silently
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
            {
                std::process::exit(0)
            }
            eprintln!("picklist: {err:?}");
            std::process::exit(2)
        }
    }
}

fn parse_args() -> PicklistOptions {
    let mut args = Vec::new();

    args.push(env::args().next().unwrap_or_else(|| String::from("picklist")));
    args.extend(
        env::var("PICKLIST_DEFAULT_OPTIONS")
            .ok()
            .and_then(|val| shlex::split(&val))
            .unwrap_or_default(),
    );
    for arg in env::args().skip(1) {
        args.push(arg);
    }

    PicklistOptions::parse_from(args).build()
}

fn read_items(opts: &PicklistOptions) -> Result<Vec<Arc<dyn PickItem>>> {
    let reader = RecordReader::default();
    if let Some(path) = &opts.source {
        return reader
            .items_of_file(path)
            .wrap_err_with(|| format!("reading records from {path}"));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        debug!("no record source given");
        return Ok(Vec::new());
    }
    Ok(reader.items_of_bufread(stdin.lock())?)
}

fn read_commands(opts: &PicklistOptions) -> Result<Vec<Command>> {
    let mut lines = match &opts.script {
        Some(path) => read_file_lines(path).wrap_err_with(|| format!("reading script {path}"))?,
        None => Vec::new(),
    };
    lines.extend(opts.command.iter().cloned());

    let mut commands = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_command(line).wrap_err_with(|| format!("command #{}", idx + 1))?;
        commands.push(command);
    }
    Ok(commands)
}

fn real_main() -> Result<i32> {
    color_eyre::install()?;
    let opts = parse_args();

    //------------------------------------------------------------------------------
    let items = read_items(&opts)?;
    let commands = read_commands(&opts)?;
    debug!("{} records, {} commands", items.len(), commands.len());

    let source = Arc::new(MemorySource::from_options(&opts, items));
    let print_events = opts.print_events;
    let output_ending = if opts.print0 { "\0" } else { "\n" };
    let print_query = opts.print_query;

    //------------------------------------------------------------------------------
    let output = Picklist::run_with_events(opts, source, commands, |event| {
        if print_events {
            eprintln!("{event:?}");
        }
    })?;

    //------------------------------------------------------------------------------
    // output
    if output.is_abort {
        return Ok(130);
    }

    let mut stdout = std::io::stdout().lock();
    if print_query {
        write!(stdout, "{}{}", output.query, output_ending)?;
    }

    let exit_code = match (&output.selection.value, &output.selection.id) {
        (Some(item), _) => {
            write!(stdout, "{}{}", item.output(), output_ending)?;
            0
        }
        (None, Some(id)) => {
            write!(stdout, "{}{}", id, output_ending)?;
            0
        }
        (None, None) => 1,
    };
    stdout.flush()?;

    Ok(exit_code)
}
