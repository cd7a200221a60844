mod database_test;
mod normalize_test;
mod pipeline_test;
