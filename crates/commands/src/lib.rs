//! User-facing command operations: registration, status lookups and notification settings.
#![allow(clippy::uninlined_format_args)]

mod error;
mod service;

pub use error::CommandError;
pub use service::{CommandService, Registration};

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chainio::ChainClient;
    use config::{ChainConfig, ChainRegistry, GovApiVersion};
    use mockito::{Matcher, Server, ServerGuard};
    use notifier::{DeliveryError, RecordingNotifier};
    use serde_json::json;
    use store::{MentionType, Repository, SqliteRepository};

    use super::*;

    const OPERATOR: &str = "hubvaloper1node";

    fn chain_config(url: &str) -> ChainConfig {
        ChainConfig {
            name: "hub".to_owned(),
            rest_api_url: url.parse().unwrap(),
            valoper_prefix: "hubvaloper".to_owned(),
            valcons_prefix: "hubvalcons".to_owned(),
            token_symbol: "HUB".to_owned(),
            decimals: 6,
            missed_blocks_supported: false,
            gov_api_version: Some(GovApiVersion::V1),
            upgrade_supported: true,
        }
    }

    type Setup = (ServerGuard, CommandService, Arc<SqliteRepository>, Arc<RecordingNotifier>);

    async fn setup() -> Setup {
        let server = Server::new_async().await;
        let registry = Arc::new(ChainRegistry::from_chains([chain_config(&server.url())]).unwrap());
        let repo = Arc::new(SqliteRepository::in_memory().await.unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = CommandService::new(
            registry,
            ChainClient::new(Duration::from_secs(2)).unwrap(),
            repo.clone(),
            notifier.clone(),
        );
        (server, service, repo, notifier)
    }

    async fn mock_validator(server: &mut ServerGuard) -> mockito::Mock {
        let body = json!({
            "validator": {
                "operator_address": OPERATOR,
                "jailed": false,
                "status": "BOND_STATUS_BONDED",
                "delegator_shares": "2500000.0",
                "description": {"moniker": "Node"},
            }
        });
        server
            .mock("GET", format!("/cosmos/staking/v1beta1/validators/{OPERATOR}").as_str())
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn register_validates_and_deduplicates() {
        let (mut server, service, repo, _) = setup().await;
        let _validator = mock_validator(&mut server).await;

        assert!(matches!(
            service.register(1, 10, "osmosis", OPERATOR).await,
            Err(CommandError::UnsupportedChain(chain)) if chain == "osmosis"
        ));
        assert!(matches!(
            service.register(1, 10, "hub", "cosmosvaloper1xyz").await,
            Err(CommandError::InvalidAddress { .. })
        ));

        assert_eq!(
            service.register(1, 10, "HUB", OPERATOR).await.unwrap(),
            Registration::Registered { moniker: "Node".to_owned() }
        );
        assert_eq!(
            service.register(1, 10, "hub", OPERATOR).await.unwrap(),
            Registration::AlreadyRegistered
        );

        let record = repo.validator_for_user(1, "hub", OPERATOR).await.unwrap().unwrap();
        assert_eq!(record.moniker.as_deref(), Some("Node"));
        assert_eq!(record.channel_id, 10);
    }

    #[tokio::test]
    async fn register_rejects_unknown_validator() {
        let (mut server, service, _, _) = setup().await;
        let _missing = server
            .mock("GET", Matcher::Regex("^/cosmos/staking/v1beta1/validators/".to_owned()))
            .with_status(404)
            .create_async()
            .await;

        assert!(matches!(
            service.register(1, 10, "hub", "hubvaloper1missing").await,
            Err(CommandError::ValidatorNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unregister_and_toggle_notifications() {
        let (mut server, service, repo, _) = setup().await;
        let _validator = mock_validator(&mut server).await;
        service.register(1, 10, "hub", OPERATOR).await.unwrap();

        assert!(service.set_validator_notifications(1, "hub", OPERATOR, false).await.unwrap());
        assert!(repo.all_monitored().await.unwrap().is_empty());
        assert!(!service.set_validator_notifications(2, "hub", OPERATOR, true).await.unwrap());

        assert!(service.unregister(1, "hub", OPERATOR).await.unwrap());
        assert!(!service.unregister(1, "hub", OPERATOR).await.unwrap());
    }

    #[tokio::test]
    async fn status_cards() {
        let (mut server, service, _, _) = setup().await;
        let _validator = mock_validator(&mut server).await;
        service.register(1, 10, "hub", OPERATOR).await.unwrap();

        let cards = service.my_validators(1, None).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title(), "Validator Status: Node");
        assert_eq!(cards[0].field_value("Total Stake"), Some("2.50 HUB"));
        assert_eq!(cards[0].field_value("Missed Blocks"), Some("N/A"));
        assert!(service.my_validators(2, Some("hub")).await.unwrap().is_empty());

        let card = service.validator_status("hub", "hubvaloper1other").await.unwrap();
        assert_eq!(card.title(), "🔴 Error: Validator Data Retrieval Failed");
        assert!(matches!(
            service.validator_status("nope", OPERATOR).await,
            Err(CommandError::UnsupportedChain(_))
        ));
    }

    #[tokio::test]
    async fn chain_preferences_are_stored() {
        let (_server, service, repo, _) = setup().await;
        service.set_chain_notifications(77, "hub", true, false, MentionType::Here).await.unwrap();

        let prefs = repo.chain_preferences("hub").await.unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].channel_id, 77);
        assert_eq!(prefs[0].mention_type, MentionType::Here);
        assert!(prefs[0].notify_gov_enabled && !prefs[0].notify_upgrade_enabled);

        let unknown = service.set_chain_notifications(77, "nope", true, true, MentionType::None);
        assert!(matches!(unknown.await, Err(CommandError::UnsupportedChain(_))));
    }

    #[tokio::test]
    async fn test_notification_reports_delivery_errors() {
        let (_server, service, _, notifier) = setup().await;
        service.test_notification(5, 42).await.unwrap();

        let sent = notifier.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].mention.as_deref(), Some("This is a test message for <@42>."));
        assert_eq!(sent[0].message.title(), "🔴 Critical Alert: Validator Jailed (Test)");

        notifier.fail_channel(6, DeliveryError::Forbidden { channel_id: 6 });
        assert!(matches!(
            service.test_notification(6, 42).await,
            Err(CommandError::Delivery(DeliveryError::Forbidden { channel_id: 6 }))
        ));
    }

    #[tokio::test]
    async fn static_messages() {
        let (_server, service, _, _) = setup().await;
        let chains = service.list_chains();
        assert_eq!(chains.title(), "Supported Networks");
        assert_eq!(chains.field_value("HUB"), Some("**Token:** HUB\n**Monitoring:** Disabled"));
        assert_eq!(service.help().title(), "Cosmos Validator Monitoring Bot");
    }
}
