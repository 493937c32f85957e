use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tastebase_core::{Settings, UserAccount, UserProfile, files};
use tracing::info;

use crate::errors::GenerationError;
use crate::model::GenerationReport;
use crate::output::write_table;
use crate::text::templates::pick;
use crate::text::vocab::{BIO_TEMPLATES, EMAIL_DOMAINS, NICK_ADJECTIVES, NICK_NOUNS, NICK_SYLLABLES};

const USERNAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const JOIN_WINDOW_DAYS: i64 = 365 * 3;
const SALT_LEN: usize = 8;

/// Generated accounts with their profiles, in id order.
#[derive(Debug, Clone)]
pub struct UserSet {
    pub accounts: Vec<UserAccount>,
    pub profiles: Vec<UserProfile>,
}

/// Generate `USER_COUNT` users and write `user_account.json` and
/// `user_profile.json`.
pub fn generate_users(
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<GenerationReport, GenerationError> {
    settings.validate().map_err(GenerationError::from_core)?;

    let mut report = GenerationReport::new("users", settings.user_seed, None);
    info!(users = settings.user_count, seed = settings.user_seed, "generating users");

    let users = build_users(settings.user_count, settings.user_seed, now);

    write_table(&settings.data_dir, files::USER_ACCOUNT, &users.accounts, &mut report)?;
    write_table(&settings.data_dir, files::USER_PROFILE, &users.profiles, &mut report)?;
    report.record_rows(users.accounts.len());

    let report_path = report.finish(&settings.data_dir)?;
    info!(
        users = users.accounts.len(),
        duration_ms = report.duration_ms,
        report = %report_path.display(),
        "users generated"
    );
    Ok(report)
}

/// Build `count` users with ids `1..=count` from a seed.
pub fn build_users(count: u32, seed: u64, now: NaiveDateTime) -> UserSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut usernames = HashSet::new();
    let mut emails = HashSet::new();
    let mut nicknames = HashSet::new();

    let mut accounts = Vec::with_capacity(count as usize);
    let mut profiles = Vec::with_capacity(count as usize);

    for user_id in 1..=i64::from(count) {
        let joined_at = random_recent(&mut rng, now);
        let username = unique_username(&mut rng, &mut usernames);
        let email = unique_email(&mut rng, &username, &mut emails);
        let password_hash = demo_password_hash(&mut rng, &username);
        let nickname = unique_nickname(&mut rng, &mut nicknames);
        let bio = pick(&mut rng, &BIO_TEMPLATES).replace("{nick}", &nickname);

        accounts.push(UserAccount {
            user_id,
            username,
            password_hash,
            email: Some(email),
            phone_number: Some(mobile_phone(&mut rng)),
            joined_at,
            is_deleted: false,
            created_at: joined_at,
            updated_at: joined_at,
        });
        profiles.push(UserProfile {
            user_id,
            nickname,
            image_path: Some(format!("/u/{user_id}")),
            bio: Some(bio),
            is_deleted: false,
            created_at: joined_at,
            updated_at: joined_at,
        });
    }

    UserSet { accounts, profiles }
}

fn random_recent<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> NaiveDateTime {
    let window = JOIN_WINDOW_DAYS * 24 * 60 * 60;
    now - Duration::seconds(rng.random_range(0..=window))
}

fn unique_username<R: Rng + ?Sized>(rng: &mut R, existing: &mut HashSet<String>) -> String {
    loop {
        let len = rng.random_range(6..=12);
        let candidate: String = (0..len)
            .map(|_| char::from(USERNAME_CHARSET[rng.random_range(0..USERNAME_CHARSET.len())]))
            .collect();
        if existing.insert(candidate.clone()) {
            return candidate;
        }
    }
}

fn unique_email<R: Rng + ?Sized>(
    rng: &mut R,
    username: &str,
    existing: &mut HashSet<String>,
) -> String {
    let mut suffix = 0_u32;
    loop {
        let local = if suffix == 0 {
            username.to_string()
        } else {
            format!("{username}{suffix}")
        };
        let candidate = format!("{local}@{}", pick(rng, &EMAIL_DOMAINS));
        if existing.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn unique_nickname<R: Rng + ?Sized>(rng: &mut R, existing: &mut HashSet<String>) -> String {
    let base = if rng.random_bool(0.65) {
        format!("{} {}", pick(rng, &NICK_ADJECTIVES), pick(rng, &NICK_NOUNS))
    } else {
        let syllables = rng.random_range(2..=4);
        let raw: String = (0..syllables).map(|_| pick(rng, &NICK_SYLLABLES)).collect();
        capitalize(&raw)
    };

    let mut candidate = base.clone();
    while !existing.insert(candidate.clone()) {
        candidate = format!("{base}{}", rng.random_range(2..=9999));
    }
    candidate
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn mobile_phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "010-{}-{}",
        rng.random_range(1000..=9999),
        rng.random_range(1000..=9999)
    )
}

/// `sha256$<salt>$<hex digest>` of a throwaway password derived from the username.
fn demo_password_hash<R: Rng + ?Sized>(rng: &mut R, username: &str) -> String {
    let password = format!("{username}!{}", rng.random_range(10..=99));
    let salt: String = (0..SALT_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    let digest = Sha256::digest(format!("{salt}{password}").as_bytes());
    format!("sha256${salt}${}", hex::encode(digest))
}
