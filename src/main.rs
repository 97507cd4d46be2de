use std::{
    fs,
    io::{self, BufRead, Write},
    process,
};

use clap::{App, Arg, ArgMatches};
use cpedit_class_file::{format, ClassFile, ClassFileError, DisplayFlags, Editor};

fn main() {
    pretty_env_logger::init();

    let matches = App::new("cpedit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Edits the constant pool of a Java class file")
        .arg(
            Arg::with_name("FILENAME")
                .help("The name of the .class file to parse")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("edit")
                .short("e")
                .long("edit")
                .help("Edit the constant pool (default is viewing only)"),
        )
        .arg(
            Arg::with_name("resolve")
                .short("r")
                .long("resolve")
                .help("Resolve the indexes in the constant pool"),
        )
        .arg(
            Arg::with_name("hide tag")
                .short("H")
                .long("hide-tag")
                .help("Hides the tag and length of the constant pool elements"),
        )
        .arg(
            Arg::with_name("hex")
                .short("x")
                .long("hex")
                .help("Displays and takes input of constant pool indices in hexadecimal"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .takes_value(true)
                .help("Saves the edited class file here instead of asking"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{}", diagnostic(&e));
        process::exit(1);
    }
}

fn diagnostic(e: &ClassFileError) -> String {
    format!("error: {}", e)
}

fn display_flags(matches: &ArgMatches) -> DisplayFlags {
    let mut flags = DisplayFlags::empty();
    flags.set(DisplayFlags::RESOLVE, matches.is_present("resolve"));
    flags.set(DisplayFlags::HIDE_TAG_AND_LENGTH, matches.is_present("hide tag"));
    flags.set(DisplayFlags::HEX, matches.is_present("hex"));
    flags
}

fn run(matches: &ArgMatches) -> Result<(), ClassFileError> {
    let flags = display_flags(matches);
    let filename = matches.value_of("FILENAME").unwrap();

    log::info!("Reading '{}'", filename);
    let bytes = fs::read(filename)?;
    let mut class_file = match ClassFile::parse(&bytes) {
        Ok(class_file) => class_file,
        Err(ClassFileError::MalformedConstantPool { partial, source }) => {
            println!("Error loading file! Dumping constant pool!");
            print!("{}", format::listing(&partial, flags));
            return Err(*source);
        }
        Err(e) => return Err(e),
    };

    print!("{}", class_file);
    print!("{}", format::listing(&class_file.constant_pool, flags));

    if !matches.is_present("edit") {
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    Editor::new(&mut class_file, flags).run(&mut stdin, &mut stdout)?;

    let destination = match matches.value_of("output") {
        Some(output) => output.to_owned(),
        None => {
            write!(stdout, "Save to [default is {}]? ", filename)?;
            stdout.flush()?;
            let mut line = String::new();
            stdin.read_line(&mut line)?;
            match line.trim() {
                "" => filename.to_owned(),
                path => path.to_owned(),
            }
        }
    };

    log::info!("Writing '{}'", destination);
    fs::write(&destination, class_file.to_bytes())?;
    writeln!(stdout, "Saved and exiting!")?;

    Ok(())
}
