//! Key exchange provider selection
//!
//! Runs complete exchanges through registries built from configuration,
//! mixing software and key-manager backed providers on the two sides.

use crate::test_utils::{init_tracing, ScriptedKeyManager};
use anyhow::Result;
use keyward_core::Config;
use keyward_kex::{
    ContextId, DhGroup, DiffieHellman, HardwareKexProvider, KexError, KexProvider, KexRegistry,
    SharedSecret, SoftwareKexProvider,
};
use std::sync::Arc;

fn hardware_config() -> Result<Config> {
    Ok(Config::from_toml_str(
        r#"
        [kex]
        providers = ["hardware", "software"]

        [hardware]
        enabled = true
        device = "/tmp/keyward-test.sock"
        "#,
    )?)
}

fn run_exchange(
    initiator: &mut dyn DiffieHellman,
    responder: &mut dyn DiffieHellman,
) -> Result<(SharedSecret, SharedSecret)> {
    let i_public = initiator.public_value()?;
    let r_public = responder.public_value()?;
    initiator.set_peer_public_value(&r_public)?;
    responder.set_peer_public_value(&i_public)?;
    Ok((initiator.shared_secret()?, responder.shared_secret()?))
}

#[test]
fn test_hardware_initiator_against_software_responder() -> Result<()> {
    init_tracing();
    let config = hardware_config()?;
    let session = Arc::new(ScriptedKeyManager::new());
    let hardware: Box<dyn KexProvider> = Box::new(HardwareKexProvider::from_config(
        Arc::clone(&session),
        &config.hardware,
    )?);

    let registry = KexRegistry::from_config(&config.kex, Some(hardware))?;
    assert_eq!(registry.names(), vec!["hardware", "software"]);

    let mut initiator = registry.create(DhGroup::Curve25519).expect("curve25519 offered");
    let mut responder = SoftwareKexProvider::new()
        .create(DhGroup::Curve25519)
        .expect("curve25519 offered");
    assert_eq!(session.live_contexts(), 1);

    let (a, b) = run_exchange(initiator.as_mut(), responder.as_mut())?;
    assert_eq!(a, b);
    assert_eq!(a.len(), 32);

    drop(initiator);
    assert_eq!(session.live_contexts(), 0);
    assert_eq!(session.resets(), vec![ContextId::new(1)]);
    Ok(())
}

#[test]
fn test_group_unsupported_by_hardware_falls_back_to_software() -> Result<()> {
    init_tracing();
    let config = hardware_config()?;
    let session = Arc::new(ScriptedKeyManager::new());
    let registry = KexRegistry::from_config(
        &config.kex,
        Some(Box::new(HardwareKexProvider::new(Arc::clone(&session)))),
    )?;

    let mut initiator = registry.create(DhGroup::Ecp256).expect("ECP-256 offered");
    let mut responder = registry.create(DhGroup::Ecp256).expect("ECP-256 offered");
    assert_eq!(session.live_contexts(), 0);
    assert_eq!(initiator.public_value()?.len(), 64);

    let (a, b) = run_exchange(initiator.as_mut(), responder.as_mut())?;
    assert_eq!(a, b);

    assert!(registry.create(DhGroup::Modp2048).is_none());
    assert!(session.resets().is_empty());
    Ok(())
}

#[test]
fn test_key_manager_outage_surfaces_as_backend_failure() -> Result<()> {
    init_tracing();
    let session = Arc::new(ScriptedKeyManager::new());
    let provider = HardwareKexProvider::new(Arc::clone(&session));
    let mut dh = provider.create(DhGroup::Curve25519).expect("curve25519 offered");

    session.go_offline();
    assert_eq!(dh.public_value(), Err(KexError::Backend));
    assert_eq!(dh.set_peer_public_value(&[9u8; 32]), Err(KexError::Backend));
    assert_eq!(dh.shared_secret(), Err(KexError::Backend));

    // Creation fails as well; no context is handed out.
    assert!(provider.create(DhGroup::Curve25519).is_none());

    // Context release is still attempted.
    drop(dh);
    assert_eq!(session.resets(), vec![ContextId::new(1)]);
    Ok(())
}

#[test]
fn test_disabled_hardware_section_refuses_session() -> Result<()> {
    init_tracing();
    let config = Config::default();
    let session = Arc::new(ScriptedKeyManager::new());
    let result = HardwareKexProvider::from_config(session, &config.hardware);
    assert!(matches!(result, Err(KexError::ProviderUnavailable(_))));
    Ok(())
}

#[test]
fn test_configured_hardware_without_session_is_rejected() -> Result<()> {
    init_tracing();
    let config = hardware_config()?;
    let result = KexRegistry::from_config(&config.kex, None);
    assert!(matches!(result, Err(KexError::ProviderUnavailable(_))));
    Ok(())
}

#[test]
fn test_concurrent_negotiations_get_distinct_contexts() -> Result<()> {
    init_tracing();
    let session = Arc::new(ScriptedKeyManager::new());
    let provider = Arc::new(HardwareKexProvider::new(Arc::clone(&session)));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let provider = Arc::clone(&provider);
            std::thread::spawn(move || -> Result<SharedSecret> {
                let mut local = provider
                    .create(DhGroup::Curve25519)
                    .ok_or_else(|| anyhow::anyhow!("no context"))?;
                let mut remote = SoftwareKexProvider::new()
                    .create(DhGroup::Curve25519)
                    .ok_or_else(|| anyhow::anyhow!("no software exchange"))?;
                let (a, b) = run_exchange(local.as_mut(), remote.as_mut())?;
                anyhow::ensure!(a == b, "secrets differ");
                Ok(a)
            })
        })
        .collect();

    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("worker panicked"))??;
    }

    let mut resets = session.resets();
    resets.sort_by_key(|c| c.value());
    assert_eq!(resets, (1..=4).map(ContextId::new).collect::<Vec<_>>());
    assert_eq!(session.live_contexts(), 0);
    Ok(())
}
