pub mod lambda;
pub mod s3;
