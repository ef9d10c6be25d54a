mod cli;
mod date_field;
mod sync;
