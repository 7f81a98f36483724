use std::collections::HashMap;
use std::fmt::Display;
use std::{env, result};

use lazy_static::lazy_static;

pub type Res<T> = Result<T, String>;

pub trait ErrToStr<T, E: Display> {
    fn err_to_str(self) -> Res<T>;
}

impl<T, E: Display> ErrToStr<T, E> for result::Result<T, E> {
    fn err_to_str(self) -> Res<T> {
        self.map_err(|err| err.to_string())
    }
}

#[derive(strum_macros::Display, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum DbgFlg {
    #[strum(serialize = "DBG_FLG_DRAFT")]
    Draft,
    #[strum(serialize = "DBG_FLG_CACHE")]
    Cache,
    #[strum(serialize = "DBG_FLG_FETCH")]
    Fetch,
}

impl DbgFlg {
    fn target(&self) -> &'static str {
        match self {
            DbgFlg::Draft => "winston_draft::draft",
            DbgFlg::Cache => "winston_draft::cache",
            DbgFlg::Fetch => "winston_draft::fetch",
        }
    }
}

lazy_static! {
    pub static ref DBG_FLG_DEFAULTS: HashMap<DbgFlg, bool> = HashMap::from([
        (DbgFlg::Draft, true),
        (DbgFlg::Cache, false),
        (DbgFlg::Fetch, true),
    ]);
}

pub fn log_if(s: &str, flg: DbgFlg) {
    if checkflag(&flg) {
        log::info!(target: flg.target(), "{}", s);
    }
}

fn checkflag(flag: &DbgFlg) -> bool {
    env::var(flag.to_string()).ok().map_or_else(
        || DBG_FLG_DEFAULTS.get(flag).copied().unwrap_or(false),
        |s| parse_flag(&s),
    )
}

fn parse_flag(s: &str) -> bool {
    s == "1" || s.eq_ignore_ascii_case("true")
}
