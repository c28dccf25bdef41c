#![forbid(unsafe_code)]

mod ids;
mod install;
mod rows;
mod shift;
mod sql;

pub(in crate::store) use ids::*;
pub(in crate::store) use install::install_schema;
pub(in crate::store) use rows::*;
pub(in crate::store) use shift::*;
pub(in crate::store) use sql::Sql;
