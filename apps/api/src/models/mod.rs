pub mod candidature;
