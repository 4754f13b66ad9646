use super::expand;
use super::parse_secret_key;
use super::Config;
use ed25519_dalek::{PublicKey, SecretKey};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::path::PathBuf;
use tracing::info;
use votecast::*;

pub fn command_dispute(matches: &clap::ArgMatches, config: &Config) {
    if let Some(matches) = matches.subcommand_matches("resolve") {
        command_dispute_resolve(matches, config);
    }
    if let Some(matches) = matches.subcommand_matches("verify") {
        command_dispute_verify(matches);
    }
}

/// Writes the signed payload where the operator asked for it
struct PayloadWriter {
    path: Option<PathBuf>,
}

impl ConfirmationUpdater for PayloadWriter {
    fn apply(
        &self,
        _election_event_id: ElectionEventId,
        _allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        let json = serde_json::to_string_pretty(payload)?;
        match &self.path {
            Some(path) => std::fs::write(path, json)
                .map_err(|e| Error::Store(format!("unable to write {}: {}", path.display(), e)))?,
            None => println!("{}", json),
        }
        Ok(true)
    }
}

pub fn command_dispute_resolve(matches: &clap::ArgMatches, config: &Config) {
    // Unwrap is safe, INPUT is required
    let filename = expand(matches.value_of("INPUT").unwrap());
    let file_bytes = match std::fs::read(&filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("votecast dispute resolve: unable to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    let extraction = DisputeExtraction::from_bytes(&file_bytes).unwrap_or_else(|e| {
        eprintln!("votecast dispute resolve: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });
    let input = DisputeResolverInput::try_from(extraction).unwrap_or_else(|e| {
        eprintln!("votecast dispute resolve: invalid extraction {}: {}", filename, e);
        std::process::exit(1);
    });
    info!(
        input = %filename,
        election_event_id = %input.election_event_id(),
        "read dispute extraction"
    );

    let secret_key = signing_key(matches, config);

    let path = match matches.value_of("output") {
        Some(output) => Some(PathBuf::from(expand(output))),
        None => config.output_dir.as_ref().map(|dir| {
            dir.join(format!(
                "resolved-confirmed-votes-{}.json",
                input.election_event_id()
            ))
        }),
    };

    let writer = PayloadWriter { path };
    let mut resolver = DisputeResolver::new();
    match resolver.resolve(&input, &secret_key, &writer) {
        Ok(signed) => {
            eprintln!(
                "votecast: resolved {} confirmed votes out of {} verification cards for election event {}",
                signed.resolved_confirmed_votes.len(),
                input.extracted_verification_card_ids().len(),
                signed.election_event_id
            );
        }
        Err(e) => {
            eprintln!("votecast dispute resolve: {}", e);
            std::process::exit(1);
        }
    }
}

fn signing_key(matches: &clap::ArgMatches, config: &Config) -> SecretKey {
    if let Some(secret_file) = matches.value_of("secret") {
        let secret_file = expand(secret_file);
        let contents = std::fs::read_to_string(&secret_file).unwrap_or_else(|e| {
            eprintln!("votecast dispute resolve: unable to read {}: {}", secret_file, e);
            std::process::exit(1);
        });
        return parse_secret_key(&contents).unwrap_or_else(|e| {
            eprintln!("votecast dispute resolve: invalid secret key in {}: {}", secret_file, e);
            std::process::exit(1);
        });
    }

    match &config.secret_key {
        Some(secret_key) => SecretKey::from_bytes(secret_key.as_bytes()).unwrap_or_else(|e| {
            eprintln!("votecast dispute resolve: invalid secret key: {}", e);
            std::process::exit(1);
        }),
        None => {
            eprintln!("Please provide a secret key either via --secret or VOTECAST_SECRET_KEY");
            std::process::exit(1);
        }
    }
}

pub fn command_dispute_verify(matches: &clap::ArgMatches) {
    // Unwrap is safe, PAYLOAD is required
    let filename = expand(matches.value_of("PAYLOAD").unwrap());
    let file_bytes = match std::fs::read(&filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("votecast dispute verify: unable to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    let signed: Signed<ResolvedConfirmedVotesPayload> = serde_json::from_slice(&file_bytes)
        .unwrap_or_else(|e| {
            eprintln!("votecast dispute verify: unable to read {}: {}", filename, e);
            std::process::exit(1);
        });

    if let Err(e) = signed.verify_signature() {
        eprintln!("votecast dispute verify: {}", e);
        std::process::exit(1);
    }

    if let Some(public_key) = matches.value_of("public-key") {
        let trusted = hex::decode(public_key.trim())
            .ok()
            .and_then(|bytes| PublicKey::from_bytes(&bytes).ok())
            .unwrap_or_else(|| {
                eprintln!("votecast dispute verify: invalid public key {}", public_key);
                std::process::exit(1);
            });
        if trusted != signed.resolver_public_key {
            eprintln!("votecast dispute verify: payload is not signed by {}", public_key);
            std::process::exit(1);
        }
    }

    println!("election-event: {}", signed.election_event_id);
    println!("resolver-public-key: {}", hex::encode(signed.resolver_public_key.to_bytes()));
    println!("resolved-confirmed-votes: {}", signed.resolved_confirmed_votes.len());
    for vote in &signed.resolved_confirmed_votes {
        println!(
            "  {} (card set {})",
            vote.verification_card_id, vote.verification_card_set_id
        );
    }
}
