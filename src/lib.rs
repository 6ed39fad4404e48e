pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod student;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod postgres;
    pub mod session;
    pub mod store;
}

pub mod ingest {
    pub mod columns;
    pub mod tabular;
}

pub mod services {
    pub mod auth;
    pub mod import;
    pub mod students;
}

pub mod handlers {
    pub mod auth;
    pub mod students;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod student_row;
}
