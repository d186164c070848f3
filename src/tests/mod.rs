pub(crate) mod envelope;
pub(crate) mod test_support;
