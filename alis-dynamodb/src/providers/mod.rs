pub mod article;
pub use article::{AlisArticleProvider, DynamoDbArticleProvider};

pub mod purchase;
pub use purchase::{AlisPurchaseProvider, DynamoDbPurchaseProvider};

pub mod tip;
pub use tip::{AlisTipProvider, DynamoDbTipProvider};

pub mod token_send;
pub use token_send::{AlisTokenSendProvider, DynamoDbTokenSendProvider};

pub mod notification;
pub use notification::{AlisNotificationProvider, DynamoDbNotificationProvider};
