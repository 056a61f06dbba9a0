pub mod pgsql;
