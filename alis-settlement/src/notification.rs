//! Notifications written once a purchase reaches a terminal status.
//!
//! Failures are logged and swallowed: the settlement status is already
//! persisted when notifications are written.
use alis_dynamodb::providers::notification::{NotificationData, NotificationType};
use alis_dynamodb::providers::purchase::PurchaseData;
use alis_dynamodb::providers::AlisNotificationProvider;
use alis_dynamodb::SettlementStatus;
use alloy_primitives::U256;
use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::limits::sort_key;

struct Recipient<'a> {
    notification_type: NotificationType,
    user_id: &'a str,
    acted_user_id: &'a str,
    price: Option<U256>,
}

fn recipients(purchase: &PurchaseData, status: SettlementStatus) -> Vec<Recipient<'_>> {
    match status {
        SettlementStatus::Done => vec![
            Recipient {
                notification_type: NotificationType::ArticlePurchased,
                user_id: &purchase.seller_user_id,
                acted_user_id: &purchase.buyer_user_id,
                price: Some(purchase.price),
            },
            Recipient {
                notification_type: NotificationType::Purchase,
                user_id: &purchase.buyer_user_id,
                acted_user_id: &purchase.seller_user_id,
                price: Some(purchase.price),
            },
        ],
        SettlementStatus::Fail => vec![Recipient {
            notification_type: NotificationType::PurchaseError,
            user_id: &purchase.buyer_user_id,
            acted_user_id: &purchase.seller_user_id,
            price: None,
        }],
        SettlementStatus::Doing => vec![],
    }
}

/// Notifies the seller and the buyer of a purchase outcome.
/// Nothing is written while the purchase is still `doing`.
pub async fn notify_purchase_result<C, N>(
    client: &C,
    notifications: &N,
    purchase: &PurchaseData,
    status: SettlementStatus,
    now: &DateTime<FixedOffset>,
) where
    C: Sync,
    N: AlisNotificationProvider<Client = C> + Sync,
{
    for recipient in recipients(purchase, status) {
        let notification = NotificationData {
            notification_id: NotificationData::build_id(
                recipient.notification_type,
                recipient.user_id,
                recipient.acted_user_id,
                &purchase.article_id,
                purchase.sort_key,
            ),
            user_id: recipient.user_id.to_string(),
            acted_user_id: recipient.acted_user_id.to_string(),
            article_id: purchase.article_id.clone(),
            article_title: purchase.article_title.clone(),
            notification_type: recipient.notification_type,
            price: recipient.price,
            sort_key: sort_key(now),
            created_at: now.timestamp(),
        };

        if let Err(e) = notifications.put_notification(client, &notification).await {
            warn!(
                "Notification {} could not be written: {}",
                notification.notification_id, e
            );
            continue;
        }

        if let Err(e) = notifications.set_unread(client, recipient.user_id).await {
            warn!("Unread flag of {} could not be set: {}", recipient.user_id, e);
            continue;
        }

        info!("Notification {} written", notification.notification_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alis_dynamodb::providers::notification::MockAlisNotificationProvider;
    use alis_dynamodb::{MockedClient, ProviderError};
    use chrono::Utc;

    fn purchase() -> PurchaseData {
        PurchaseData {
            article_id: "article1".to_string(),
            buyer_user_id: "buyer".to_string(),
            seller_user_id: "seller".to_string(),
            article_title: "title".to_string(),
            price: U256::from(100u64),
            status: SettlementStatus::Doing,
            transaction: None,
            burn_transaction: None,
            history_created_at: 1,
            sort_key: 42,
            created_at: 1,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap())
    }

    #[tokio::test]
    async fn done_notifies_both_parties() {
        let mut provider = MockAlisNotificationProvider::default();
        provider
            .expect_put_notification()
            .withf(|_, n| {
                n.notification_id == "purchased-seller-buyer-article1-42"
                    && n.user_id == "seller"
                    && n.price == Some(U256::from(100u64))
            })
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_put_notification()
            .withf(|_, n| n.notification_id == "purchase-buyer-seller-article1-42")
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_set_unread()
            .withf(|_, user| user == "seller" || user == "buyer")
            .times(2)
            .returning(|_, _| Ok(()));

        notify_purchase_result(
            &MockedClient,
            &provider,
            &purchase(),
            SettlementStatus::Done,
            &now(),
        )
        .await;
    }

    #[tokio::test]
    async fn fail_notifies_buyer_only() {
        let mut provider = MockAlisNotificationProvider::default();
        provider
            .expect_put_notification()
            .withf(|_, n| {
                n.notification_type == NotificationType::PurchaseError && n.user_id == "buyer"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_set_unread()
            .withf(|_, user| user == "buyer")
            .times(1)
            .returning(|_, _| Ok(()));

        notify_purchase_result(
            &MockedClient,
            &provider,
            &purchase(),
            SettlementStatus::Fail,
            &now(),
        )
        .await;
    }

    #[tokio::test]
    async fn doing_writes_nothing() {
        let provider = MockAlisNotificationProvider::default();
        notify_purchase_result(
            &MockedClient,
            &provider,
            &purchase(),
            SettlementStatus::Doing,
            &now(),
        )
        .await;
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let mut provider = MockAlisNotificationProvider::default();
        provider
            .expect_put_notification()
            .times(2)
            .returning(|_, _| Err(ProviderError::DatabaseError("throttled".to_string())));
        provider.expect_set_unread().times(0);

        notify_purchase_result(
            &MockedClient,
            &provider,
            &purchase(),
            SettlementStatus::Done,
            &now(),
        )
        .await;
    }
}
