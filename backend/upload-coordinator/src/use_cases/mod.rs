pub mod complete_upload;
pub mod create_video;
pub mod generate_batch_of_urls;
pub mod reconcile_from_webhook;
pub mod report_part_uploaded;
