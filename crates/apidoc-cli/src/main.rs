use std::process;

fn main() {
    match apidoc_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("apidoc error: {err:#}");
            process::exit(1);
        }
    }
}
