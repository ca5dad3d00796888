pub mod sale;

pub use sale::Sale;
