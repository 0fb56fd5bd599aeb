//! Backend calls for profiles and avatars.
use serde_json::Value;

use crate::backend::{
    errors::{BackendErrorKind, BackendResult},
    types::{ReadQuery, Table, WriteMode},
    DataBackend,
};
use crate::core::dates::now_timestamp;

use super::types::{avatar_path, UserProfile};

pub const AVATAR_BUCKET: &str = "avatars";
const PROFILE_KEY: &str = "id";

/// The user's profile, or a blank one when none has been saved.
pub fn load_profile(backend: &dyn DataBackend) -> BackendResult<UserProfile> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;
    let query = ReadQuery::new(Table::UserProfiles, "*").eq(PROFILE_KEY, &session.user_id);
    match backend.read(&query)? {
        Some(record) => serde_json::from_value(Value::Object(record))
            .map_err(|err| BackendErrorKind::decode(err.to_string())),
        None => Ok(UserProfile::empty(session.user_id)),
    }
}

/// Upserts the profile on `id`, stamping `updated_at`.
pub fn save_profile(backend: &dyn DataBackend, profile: &UserProfile) -> BackendResult<UserProfile> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;

    let mut updated = profile.clone();
    updated.id = session.user_id;
    updated.updated_at = Some(now_timestamp());

    let record = match serde_json::to_value(&updated) {
        Ok(Value::Object(record)) => record,
        Ok(_) => return Err(BackendErrorKind::invalid("profile did not serialize to a row")),
        Err(err) => return Err(BackendErrorKind::invalid(err.to_string())),
    };
    backend.write(Table::UserProfiles, record, WriteMode::upsert(PROFILE_KEY))?;
    Ok(updated)
}

/// Saves the editable text fields over the stored profile, keeping the
/// stored avatar URL.
pub fn save_profile_details(
    backend: &dyn DataBackend,
    draft: &UserProfile,
) -> BackendResult<UserProfile> {
    let mut profile = load_profile(backend)?;
    profile.username = draft.username.clone();
    profile.bio = draft.bio.clone();
    profile.age = draft.age;
    profile.location = draft.location.clone();
    profile.gender = draft.gender.clone();
    save_profile(backend, &profile)
}

/// Uploads an avatar image (replacing any previous one) and saves its public
/// URL on the profile.
pub fn upload_avatar(
    backend: &dyn DataBackend,
    file_name: &str,
    bytes: Vec<u8>,
) -> BackendResult<UserProfile> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;
    let path = avatar_path(&session.user_id, file_name)
        .map_err(|err| BackendErrorKind::invalid(err.to_string()))?;

    let public_url = backend.upload_file(AVATAR_BUCKET, &path, bytes)?;

    let mut profile = load_profile(backend)?;
    profile.avatar_url = public_url;
    save_profile(backend, &profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn signed_in() -> (MemoryBackend, String) {
        let backend = MemoryBackend::new();
        let session = backend
            .sign_up("ada@example.com", "secret-pass")
            .expect("sign up")
            .expect("session");
        (backend, session.user_id)
    }

    #[test]
    fn missing_profile_is_blank() {
        let (backend, user_id) = signed_in();
        let profile = load_profile(&backend).expect("load");
        assert_eq!(profile, UserProfile::empty(user_id));
    }

    #[test]
    fn save_then_load_round_trips_fields() {
        let (backend, user_id) = signed_in();
        let mut profile = UserProfile::empty("ignored");
        profile.username = "ada".to_string();
        profile.set_age_text("36").expect("age");

        let saved = save_profile(&backend, &profile).expect("save");
        assert_eq!(saved.id, user_id);
        assert!(saved.updated_at.is_some());

        let loaded = load_profile(&backend).expect("load");
        assert_eq!(loaded.username, "ada");
        assert_eq!(loaded.age, Some(36));
    }

    #[test]
    fn avatar_upload_updates_profile_url() {
        let (backend, user_id) = signed_in();
        let profile = upload_avatar(&backend, "me.png", vec![0x89, 0x50]).expect("upload");
        let expected_path = format!("{user_id}.png");
        assert_eq!(profile.avatar_url, format!("memory://avatars/{expected_path}"));
        assert!(backend.file(AVATAR_BUCKET, &expected_path).is_some());
        assert_eq!(load_profile(&backend).expect("load").avatar_url, profile.avatar_url);
    }

    #[test]
    fn saving_details_keeps_the_uploaded_avatar() {
        let (backend, _) = signed_in();
        let stale = load_profile(&backend).expect("load");
        let uploaded = upload_avatar(&backend, "me.jpg", vec![0xff, 0xd8]).expect("upload");

        let mut draft = stale;
        draft.username = "ada".to_string();
        draft.bio = "Runs at dawn.".to_string();
        let saved = save_profile_details(&backend, &draft).expect("save");

        assert_eq!(saved.avatar_url, uploaded.avatar_url);
        let loaded = load_profile(&backend).expect("load");
        assert_eq!(loaded.avatar_url, uploaded.avatar_url);
        assert_eq!(loaded.username, "ada");
        assert_eq!(loaded.bio, "Runs at dawn.");
    }

    #[test]
    fn avatar_without_extension_is_rejected() {
        let (backend, _) = signed_in();
        let err = upload_avatar(&backend, "avatar", vec![1]).expect_err("no extension");
        assert!(matches!(err, BackendErrorKind::Invalid { .. }));
    }
}
