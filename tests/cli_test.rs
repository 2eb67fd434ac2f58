use assert_cmd::prelude::*; // Add methods on commands
use lzomega::lzss_omega;
use predicates::prelude::*;
use std::path::{PathBuf,Path};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

// Make a copy in temporary directory with LF newlines.
// This insulates us against newline substitutions inserted by git or other layers.
fn copy_and_fix_newlines(in_file: PathBuf,temp_dir: &tempfile::TempDir) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let txt = std::fs::read(in_file)?;
    let new_txt: Vec<u8> = txt.into_iter().filter(|c| *c != 13).collect();
    let new_txt_path = temp_dir.path().join("converted.txt");
    std::fs::write(&new_txt_path,new_txt)?;
    Ok(new_txt_path)
}

fn round_trip_test(base_name: &str,window: usize,lookahead: usize) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = copy_and_fix_newlines(Path::new("tests").join([base_name,".txt"].concat()),&temp_dir)?;
    let cmp_path = temp_dir.path().join([base_name,".lzo"].concat());
    let out_path = temp_dir.path().join([base_name,".txt"].concat());
    Command::cargo_bin("lzomega")?
        .arg("compress")
        .arg("-w").arg(window.to_string())
        .arg("-l").arg(lookahead.to_string())
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));
    Command::cargo_bin("lzomega")?
        .arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    let original = std::fs::read(&in_path)?;
    let mut opt = lzss_omega::STD_OPTIONS;
    opt.window = window;
    opt.lookahead = lookahead;
    // the binary writes exactly what the library produces
    assert_eq!(std::fs::read(&cmp_path)?,lzss_omega::compress_slice(&original,&opt)?);
    assert_eq!(std::fs::read(&out_path)?,original);
    Ok(())
}

#[test]
fn single_round_trip() -> STDRESULT {
    round_trip_test("single",4,4)?;
    round_trip_test("single",0,0)
}

#[test]
fn double_round_trip() -> STDRESULT {
    round_trip_test("double",8,8)?;
    round_trip_test("double",30,3)
}

#[test]
fn lorem_round_trip() -> STDRESULT {
    round_trip_test("lorem_ipsum",1024,64)?;
    round_trip_test("lorem_ipsum",31,31)?;
    round_trip_test("lorem_ipsum",5,2)
}

#[test]
fn library_round_trip_all_windows() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    for base_name in ["single","double","lorem_ipsum"] {
        let in_path = copy_and_fix_newlines(Path::new("tests").join([base_name,".txt"].concat()),&temp_dir)?;
        let original = std::fs::read(&in_path)?;
        for window in 0..31 {
            for lookahead in 0..31 {
                let mut opt = lzss_omega::STD_OPTIONS;
                opt.window = window;
                opt.lookahead = lookahead;
                let compressed = lzss_omega::compress_slice(&original,&opt)?;
                assert_eq!(lzss_omega::expand_slice(&compressed,&opt)?,original,"{} w {} l {}",base_name,window,lookahead);
            }
        }
    }
    Ok(())
}

#[test]
fn concrete_output() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("aaaa.txt");
    let out_path = temp_dir.path().join("aaaa.lzo");
    std::fs::write(&in_path,"aaaa")?;
    Command::cargo_bin("lzomega")?
        .arg("compress")
        .arg("-w").arg("4")
        .arg("-l").arg("4")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(&out_path)?,hex::decode("E194B0")?);
    Ok(())
}

#[test]
fn empty_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("empty.txt");
    let out_path = temp_dir.path().join("empty.lzo");
    std::fs::write(&in_path,"")?;
    Command::cargo_bin("lzomega")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyInput"));
    assert!(!out_path.exists());
    Ok(())
}

#[test]
fn corrupt_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("junk.lzo");
    let out_path = temp_dir.path().join("junk.txt");
    // announces 192 distinct characters
    std::fs::write(&in_path,[0x0f,0x00])?;
    Command::cargo_bin("lzomega")?
        .arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    assert!(!out_path.exists());
    Ok(())
}
