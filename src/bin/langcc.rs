//! The langcc driver: compile a grammar file, parse an input file, print selected artifacts.

use clap::error::ErrorKind;
use clap::{arg, value_parser, ArgMatches, Command};
use lang_cc::{meta, GrammarBuilder};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

fn command() -> Command {
    Command::new("langcc")
        .version("0.1.0")
        .about("Compile a grammar and parse an input file against it.")
        .arg(arg!(-s --scanner "Print the meta scanner token stream"))
        .arg(arg!(-a --ast "Print the parsed grammar rules"))
        .arg(arg!(-p --productions "Print the interned productions"))
        .arg(arg!(-g --grammar "Print first sets and itemsets (follow sets with --verbose)"))
        .arg(arg!(-t --table "Print the SRNGLR parse table"))
        .arg(arg!(-c --compile "Parse the input and report acceptance and ambiguity"))
        .arg(arg!(-f --forest "Print the BSR store, the CRF and the derivation forest"))
        .arg(arg!(--verbose "Print more detail for the selected artifacts"))
        .arg(
            arg!(<GRAMMAR> "Path to the grammar file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(<INPUT> "Path to the input file")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn main() -> ExitCode {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", err);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprint!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let grammar_path = matches.get_one::<PathBuf>("GRAMMAR").expect("required");
    let input_path = matches.get_one::<PathBuf>("INPUT").expect("required");

    let grammar_source = fs::read_to_string(grammar_path)
        .map_err(|err| format!("Failed to read {}: {}", grammar_path.display(), err))?;
    let input_text = fs::read_to_string(input_path)
        .map_err(|err| format!("Failed to read {}: {}", input_path.display(), err))?;

    let mut scanner = matches.get_flag("scanner");
    let mut ast = matches.get_flag("ast");
    let mut productions = matches.get_flag("productions");
    let mut grammar_phase = matches.get_flag("grammar");
    let mut table_phase = matches.get_flag("table");
    let mut compile = matches.get_flag("compile");
    let mut forest = matches.get_flag("forest");
    let verbose = matches.get_flag("verbose");

    // no phases selected means all of them
    if !(scanner || ast || productions || grammar_phase || table_phase || compile || forest) {
        scanner = true;
        ast = true;
        productions = true;
        grammar_phase = true;
        table_phase = true;
        compile = true;
        forest = true;
    }

    if scanner {
        println!("META SCANNER OUTPUT:");
        let tokens = meta::scan(&grammar_source).map_err(|err| err.to_string())?;
        for token in &tokens {
            if verbose {
                println!("{:?}", token);
            } else {
                print!("{} ", token.text);
            }
        }
        println!("\n");
    }

    let rules = meta::parse_rules(&grammar_source).map_err(|err| err.to_string())?;
    if ast {
        println!("META RULES OUTPUT:");
        for rule in &rules {
            println!("{}", rule);
        }
        println!();
    }

    let mut builder = GrammarBuilder::new();
    if let Some(first) = rules.first() {
        builder = builder.start(&first.head);
    }
    for rule in rules {
        builder = builder.rule(&rule.head, rule.bodies);
    }
    let grammar = builder.build().map_err(|err| err.to_string())?;

    if productions {
        println!("PRODUCTIONS OUTPUT:");
        let mut out = String::new();
        grammar
            .write_productions(&mut out)
            .map_err(|err| err.to_string())?;
        println!("{}", out);
    }

    if grammar_phase || table_phase {
        let table = grammar.build_srnglr_table();

        if grammar_phase {
            println!("GRAMMAR OUTPUT:");
            println!("first sets:");
            let mut firsts = String::new();
            grammar.write_firsts(&mut firsts).map_err(|err| err.to_string())?;
            println!("{}", firsts);
            if verbose {
                println!("follow sets:");
                let mut follows = String::new();
                grammar
                    .write_follows(&mut follows)
                    .map_err(|err| err.to_string())?;
                println!("{}", follows);
            }
            println!("itemsets:");
            let mut itemsets = String::new();
            table
                .write_itemsets(&grammar, &mut itemsets)
                .map_err(|err| err.to_string())?;
            println!("{}", itemsets);
        }

        if table_phase {
            println!("SRNGLR TABLE:");
            let mut out = String::new();
            table
                .write_table(&grammar, &mut out)
                .map_err(|err| err.to_string())?;
            println!("{}", out);
        }
    }

    if compile || forest {
        // a single trailing newline is an artifact of the input file, not of the language
        let text = input_text.strip_suffix('\n').unwrap_or(&input_text);
        let result = grammar.parse_cnp_str(text);

        if compile {
            println!("PARSE OUTPUT:");
            if result.accepted() {
                println!("accepted with ambiguity degree {}", result.ambiguity());
            } else {
                println!("rejected");
            }
            println!();
        }

        if forest {
            println!("BSR OUTPUT:");
            let mut bsr = String::new();
            result
                .write_bsr(&grammar, &mut bsr)
                .map_err(|err| err.to_string())?;
            println!("{}", bsr);

            println!("CRF OUTPUT:");
            let mut crf = String::new();
            result
                .write_crf(&grammar, &mut crf)
                .map_err(|err| err.to_string())?;
            println!("{}", crf);

            if result.accepted() {
                println!("FOREST:");
                result
                    .print_forest(&grammar)
                    .map_err(|err| err.to_string())?;
            }
        }
    }

    Ok(())
}
