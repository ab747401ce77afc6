use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use mktemp::Temp;
use ring::digest;

use textcodecs::error::Error;
use textcodecs::{arith, bwt, hamming, huff};

type Codec = fn(BufReader<File>, BufWriter<File>) -> Result<BufWriter<File>, Error>;

const CODECS: [(&str, Codec, Codec); 4] = [
    ("huffman", huff::encode, huff::decode),
    ("arithmetic", arith::encode, arith::decode),
    ("bwt", bwt::encode, bwt::decode),
    ("hamming", hamming::encode, hamming::decode),
];

fn run(codec: Codec, input: &Path, output: &Path) {
    let inf = File::open(input).unwrap();
    let outf = File::create(output).unwrap();
    let mut out = codec(BufReader::new(inf), BufWriter::new(outf)).unwrap();
    out.flush().unwrap();
}

fn sha256(path: &Path) -> Vec<u8> {
    let mut data = Vec::new();
    File::open(path).unwrap().read_to_end(&mut data).unwrap();
    digest::digest(&digest::SHA256, &data).as_ref().to_vec()
}

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

fn check_roundtrip(dir: &Path, name: &str, content: &[u8]) {
    let original = write_file(dir, name, content);
    for (method, encode, decode) in CODECS.iter() {
        let encoded = dir.join(format!("{}.{}", name, method));
        let decoded = dir.join(format!("{}.{}.out", name, method));
        run(*encode, &original, &encoded);
        run(*decode, &encoded, &decoded);
        assert_eq!(sha256(&original), sha256(&decoded), "{} on {}", method, name);
    }
}

#[test]
fn sources_roundtrip() {
    let temp_dir = Temp::new_dir().unwrap();
    let dir = temp_dir.to_path_buf();
    check_roundtrip(&dir, "lib.rs", include_bytes!("../src/lib.rs"));
    check_roundtrip(&dir, "linefile.rs", include_bytes!("../src/linefile.rs"));
    check_roundtrip(&dir, "manifest", include_bytes!("../Cargo.toml"));
}

#[test]
fn small_files_roundtrip() {
    let temp_dir = Temp::new_dir().unwrap();
    let dir = temp_dir.to_path_buf();
    check_roundtrip(&dir, "empty", b"");
    check_roundtrip(&dir, "newline", b"\n");
    check_roundtrip(&dir, "aab", b"aab\n");
    check_roundtrip(&dir, "crlf", b"first\r\nsecond\r\n");
    check_roundtrip(&dir, "unicode", "Кодирование текста\n符号化\n".as_bytes());
}

#[test]
fn block_sized_file_roundtrip() {
    let temp_dir = Temp::new_dir().unwrap();
    let dir = temp_dir.to_path_buf();
    let line: String = (0..99).map(|i| (b'a' + (i * 11 % 26) as u8) as char).collect();
    let content = format!("{}\n", line).repeat(25);
    check_roundtrip(&dir, "blocks", content.as_bytes());
}

#[test]
fn unterminated_file_gains_newline() {
    let temp_dir = Temp::new_dir().unwrap();
    let dir = temp_dir.to_path_buf();
    let original = write_file(&dir, "plain", b"no newline at end");
    for (method, encode, decode) in CODECS.iter() {
        let encoded = dir.join(format!("plain.{}", method));
        let decoded = dir.join(format!("plain.{}.out", method));
        run(*encode, &original, &encoded);
        run(*decode, &encoded, &decoded);
        assert_eq!(&b"no newline at end\n"[..], &fs::read(&decoded).unwrap()[..], "{}", method);
    }
}
