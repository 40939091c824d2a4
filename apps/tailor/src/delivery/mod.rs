// Delivery: archive finished PDFs in object storage and mail the batch.

pub mod email;
pub mod storage;
