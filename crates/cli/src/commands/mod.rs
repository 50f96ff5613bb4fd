pub(crate) mod client;
pub(crate) mod migrate;
pub(crate) mod serve;
