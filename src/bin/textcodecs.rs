// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use getopts::Options;
use log::{debug, LevelFilter};
use mktemp::Temp;
use ring::digest;

use textcodecs::error::Error;
use textcodecs::{arith, bwt, hamming, huff, linefile};

type Codec = fn(BufReader<File>, BufWriter<File>) -> Result<BufWriter<File>, Error>;

#[derive(Debug, Clone, Copy)]
enum Method {
    Huffman,
    Arithmetic,
    Bwt,
    Hamming,
}

impl Method {
    fn from_name(name: &str) -> Option<Method> {
        match name {
            "huffman"    => Some(Method::Huffman),
            "arithmetic" => Some(Method::Arithmetic),
            "bwt"        => Some(Method::Bwt),
            "hamming"    => Some(Method::Hamming),
            _            => None,
        }
    }

    fn encoder(self) -> Codec {
        match self {
            Method::Huffman    => huff::encode,
            Method::Arithmetic => arith::encode,
            Method::Bwt        => bwt::encode,
            Method::Hamming    => hamming::encode,
        }
    }

    fn decoder(self) -> Codec {
        match self {
            Method::Huffman    => huff::decode,
            Method::Arithmetic => arith::decode,
            Method::Bwt        => bwt::decode,
            Method::Hamming    => hamming::decode,
        }
    }
}

/// Run `codec` from the file `input` into the file `output`.
fn run(codec: Codec, input: &Path, output: &Path) -> Result<(), Error> {
    let inf = File::open(input)?;
    let outf = File::create(output)?;
    let mut out = codec(BufReader::new(inf), BufWriter::new(outf))?;
    out.flush()?;
    Ok(())
}

fn file_size(path: &Path) -> io::Result<u64> {
    Ok(File::open(path)?.metadata()?.len())
}

fn file_digest(path: &Path) -> io::Result<digest::Digest> {
    let mut buf = [0u8; 1024 * 4];
    let mut ctx = digest::Context::new(&digest::SHA256);
    let mut inf = File::open(path)?;
    let mut nread = inf.read(&mut buf[..])?;
    while nread > 0 {
        ctx.update(&buf[0..nread]);
        nread = inf.read(&mut buf[..])?;
    }
    Ok(ctx.finish())
}

fn do_test(input: &Path, method: Method) -> Result<(), Error> {
    let temp_dir = Temp::new_dir()?;
    let mut encoded_name = temp_dir.to_path_buf();
    encoded_name.push("textcodecs-test.encoded");
    let mut decoded_name = temp_dir.to_path_buf();
    decoded_name.push("textcodecs-test.decoded");

    println!("Calculating hash for input file {}...", input.display());
    let orig_hash = file_digest(input)?;

    println!("Encoding {} to {} (method: {:?})...", input.display(), encoded_name.display(), method);
    let start = Instant::now();
    run(method.encoder(), input, &encoded_name)?;
    let encode_secs = start.elapsed().as_secs_f64();

    println!("Decoding {} to {} (method: {:?})...", encoded_name.display(), decoded_name.display(), method);
    let start = Instant::now();
    run(method.decoder(), &encoded_name, &decoded_name)?;
    let decode_secs = start.elapsed().as_secs_f64();

    println!("Calculating hash for decoded file {}...", decoded_name.display());
    let decoded_hash = file_digest(&decoded_name)?;

    let orig_size = file_size(input)?;
    let encoded_size = file_size(&encoded_name)?;
    let decoded_size = file_size(&decoded_name)?;
    println!("Original size: {}", orig_size);
    println!("Encoded size: {}", encoded_size);
    println!("Ratio: {:.2}", encoded_size as f32 / orig_size as f32);
    debug!("encoding took {:.3}s, decoding {:.3}s", encode_secs, decode_secs);

    if orig_size != decoded_size {
        println!("ERROR: original and decoded file differ in size");
    } else if orig_hash.as_ref() != decoded_hash.as_ref() {
        println!("ERROR: original and decoded file hashes differ");
    } else {
        println!("OK.");
    }
    Ok(())
}

/// Compare the text of two files with their line terminators removed.
fn do_compare(first: &Path, second: &Path) -> Result<(), Error> {
    let first = linefile::read_lines(BufReader::new(File::open(first)?))?;
    let second = linefile::read_lines(BufReader::new(File::open(second)?))?;
    if first.concat() == second.concat() {
        println!("The contents of the files are equal");
    } else {
        println!("The contents of the files differ");
    }
    Ok(())
}

/// Print a usage summary to stdout that describes the command syntax.
fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} -m METHOD (-e|-d) -i INPUT -o OUTPUT\n       \
                         {} -m METHOD -t -i INPUT\n       \
                         {} --compare -i FILE -o FILE",
                        program, program, program);
    print!("{}", opts.usage(&brief));
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn check_input(input: &str) {
    if !Path::new(input).exists() {
        println!("Input file {} does not exist", input);
        process::exit(1);
    }
}

pub fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "input", "set input file", "FILE");
    opts.optopt("o", "output", "set output file", "FILE");
    opts.optflag("e", "encode", "encode the input file");
    opts.optflag("d", "decode", "decode the input file");
    opts.optflag("t", "test", "encode and decode a file, and check the result");
    opts.optflag("", "compare", "compare the text of the input and output files");
    opts.optopt("m", "method", "select coding method", "huffman|arithmetic|bwt|hamming");
    opts.optflag("v", "verbose", "log debug messages");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(e) => {
            println!("Error: {}", e);
            print_usage(&program, &opts);
            process::exit(1);
        },
    };
    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return;
    }
    init_logging(matches.opt_present("v"));

    let method = matches.opt_str("m").and_then(|s| Method::from_name(&s));
    let result =
        if matches.opt_present("compare") {
            match (matches.opt_str("i"), matches.opt_str("o")) {
                (Some(first), Some(second)) => {
                    check_input(&first);
                    check_input(&second);
                    do_compare(Path::new(&first), Path::new(&second))
                },
                _ => {
                    print_usage(&program, &opts);
                    process::exit(1);
                },
            }
        } else if matches.opt_present("t") {
            match (method, matches.opt_str("i")) {
                (Some(m), Some(input)) => {
                    check_input(&input);
                    do_test(Path::new(&input), m)
                },
                _ => {
                    print_usage(&program, &opts);
                    process::exit(1);
                },
            }
        } else {
            match (method, matches.opt_present("e"), matches.opt_present("d"),
                   matches.opt_str("i"), matches.opt_str("o")) {
                (Some(m), true, false, Some(input), Some(output)) => {
                    check_input(&input);
                    run(m.encoder(), Path::new(&input), Path::new(&output))
                },
                (Some(m), false, true, Some(input), Some(output)) => {
                    check_input(&input);
                    run(m.decoder(), Path::new(&input), Path::new(&output))
                },
                _ => {
                    print_usage(&program, &opts);
                    process::exit(1);
                },
            }
        };

    match result {
        Ok(()) => println!("Done."),
        Err(e) => {
            println!("Input/output error, check that the given data is correct: {}", e);
            process::exit(1);
        },
    }
}
