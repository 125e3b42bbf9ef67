pub mod blob_get;
pub mod commit;
pub mod encode;
pub mod leaves;
pub mod prove;
pub mod tree;
pub mod verify;
