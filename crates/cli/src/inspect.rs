//! Small inspection commands: `parse-area`, `pnu`, `config`.

use std::path::PathBuf;

use serde::Serialize;

use landpermit_config::FormConfig;
use landpermit_engine::AreaFraction;
use landpermit_recon::Pnu;

use crate::exit_codes::EXIT_PNU_INVALID;
use crate::CliError;

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::other(format!("cannot serialize output: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn cmd_parse_area(raw: &str, json: bool) -> Result<(), CliError> {
    if raw.trim().is_empty() {
        return Err(CliError::args("empty land-area value"));
    }
    let fraction = AreaFraction::parse(raw);
    if json {
        return print_json(&fraction);
    }
    println!("share: {}", fraction.share);
    match fraction.total {
        Some(total) => println!("total: {total}"),
        None => println!("total: -"),
    }
    Ok(())
}

#[derive(Serialize)]
struct PnuParts<'a> {
    pnu: &'a str,
    sigungu_code: &'a str,
    bjdong_code: &'a str,
    mountain: bool,
    bun: &'a str,
    ji: &'a str,
    jibun: String,
}

pub fn cmd_pnu(code: &str, json: bool) -> Result<(), CliError> {
    let pnu = Pnu::parse(code).map_err(|e| CliError::new(EXIT_PNU_INVALID, e.to_string()))?;
    print_pnu(&pnu, json)
}

pub fn cmd_pnu_compose(
    adm_code: &str,
    mountain: bool,
    bun: &str,
    ji: &str,
    json: bool,
) -> Result<(), CliError> {
    let pnu = Pnu::compose(adm_code, mountain, bun, ji)
        .map_err(|e| CliError::new(EXIT_PNU_INVALID, e.to_string()))?;
    print_pnu(&pnu, json)
}

fn print_pnu(pnu: &Pnu, json: bool) -> Result<(), CliError> {
    let parts = PnuParts {
        pnu: pnu.as_str(),
        sigungu_code: pnu.sigungu_code(),
        bjdong_code: pnu.bjdong_code(),
        mountain: pnu.is_mountain(),
        bun: pnu.bun(),
        ji: pnu.ji(),
        jibun: pnu.jibun(),
    };
    if json {
        return print_json(&parts);
    }
    println!("pnu:     {}", parts.pnu);
    println!("sigungu: {}", parts.sigungu_code);
    println!("bjdong:  {}", parts.bjdong_code);
    println!("lot:     {}{}", if parts.mountain { "산 " } else { "" }, parts.jibun);
    Ok(())
}

pub fn cmd_config_path() -> Result<(), CliError> {
    println!("{}", FormConfig::default_path().display());
    Ok(())
}

pub fn cmd_config_show(path: Option<PathBuf>) -> Result<(), CliError> {
    let config = match path {
        Some(path) => FormConfig::load(&path).map_err(CliError::config)?,
        None => FormConfig::load_or_default(),
    };
    let toml = config.to_toml().map_err(CliError::config)?;
    print!("{toml}");
    Ok(())
}
