use clap::{arg,crate_version,value_parser,Command};
use lzomega::lzss_omega;
use std::io::Cursor;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        return ans.trim_end()=="y" || ans.trim_end()=="Y";
    }
    true
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `lzomega compress -w 1024 -l 64 -i my_text.txt -o my_compressed`
Expand:        `lzomega expand -i my_compressed -o my_text.txt`";

    let mut main_cmd = Command::new("lzomega")
        .about("Compress and expand ASCII text with LZSS, Huffman, and Elias omega codes")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-w --window <SIZE> "how far back a match may start").value_parser(value_parser!(usize))
            .required(false))
        .arg(arg!(-l --lookahead <SIZE> "longest match").value_parser(value_parser!(usize))
            .required(false))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let mut opt = lzss_omega::STD_OPTIONS;
        if let Some(window) = cmd.get_one::<usize>("window") {
            opt.window = *window;
        }
        if let Some(lookahead) = cmd.get_one::<usize>("lookahead") {
            opt.lookahead = *lookahead;
        }
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        log::info!("window {}, lookahead {}",opt.window,opt.lookahead);
        let mut in_file = std::fs::File::open(path_in)?;
        // nothing is written unless compression succeeds
        let mut out_buf: Cursor<Vec<u8>> = Cursor::new(Vec::new());
        let (in_size,out_size) = lzss_omega::compress(&mut in_file,&mut out_buf,&opt)?;
        std::fs::write(path_out,out_buf.into_inner())?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_buf: Cursor<Vec<u8>> = Cursor::new(Vec::new());
        let (in_size,out_size) = lzss_omega::expand(&mut in_file,&mut out_buf,&lzss_omega::STD_OPTIONS)?;
        std::fs::write(path_out,out_buf.into_inner())?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    Ok(())
}
