//! End-to-end protocol scenarios across the three roles.

use std::sync::{Arc, Once};

use rand::{rngs::StdRng, SeedableRng};
use vdstream::owner::BatchHeader;
use vdstream::server::ServerError;
use vdstream::{Crs, DataOwner, StorageServer, Verifier, VerifierError, F};

const N: usize = 16;

/// Install a log subscriber once so rejected sub-checks are visible under
/// `RUST_LOG=debug`.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn rng() -> StdRng {
    StdRng::from_seed([113u8; 32])
}

struct System {
    owner: DataOwner,
    server: StorageServer,
    verifier: Verifier,
}

fn system(n: usize, rng: &mut StdRng) -> System {
    init_tracing();
    let crs = Arc::new(Crs::keygen(n, rng));
    crs.validate().expect("fresh CRS validates");
    let owner = DataOwner::new(crs.clone(), rng);
    let server = StorageServer::new(crs.clone(), owner.initial_server_keys());
    let verifier = Verifier::new(crs, owner.global_pk());
    System { owner, server, verifier }
}

fn scalars(values: impl IntoIterator<Item = u64>) -> Vec<F> {
    values.into_iter().map(F::from).collect()
}

fn ones(n: usize) -> Vec<F> {
    vec![F::from(1u64); n]
}

/// Consumer happy path: m = [10, 20, …, 160], all-ones challenge, x = 1360.
#[test]
fn consumer_query_happy_path() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let m = scalars((1..=16).map(|i| 10 * i));
    let t_vec = ones(N);
    let (id, header, secrets) = sys.owner.create_batch_single(&m, &t_vec, &mut rng).unwrap();
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    let f = sys.owner.global_pk().f_current;
    let challenge = ones(N);
    let proof = sys.server.generate_dc_data_proof(&id, &challenge, &f, 0).unwrap();
    assert_eq!(proof.x, F::from(1360u64));
    assert!(sys
        .verifier
        .verify_dc_query(&header, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());
}

/// Auditor happy path: the server's derived challenge matches the
/// verifier's recomputation bit for bit and the proof passes.
#[test]
fn auditor_happy_path() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let m = scalars((1..=16).map(|i| 10 * i));
    let (id, header, secrets) = sys.owner.create_batch_single(&m, &ones(N), &mut rng).unwrap();
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    let f = sys.owner.global_pk().f_current;
    let proof = sys.server.generate_da_audit_proof(&id, &f, 0).unwrap();
    assert!(sys
        .verifier
        .verify_da_audit(&header, N, &proof.x, &proof.pi, &proof.t_challenge, &proof.witness, 0)
        .unwrap());
}

/// Rollback attempt: an out-of-date verifier still accepts, and the same
/// proof fails the moment the dynamic public key is refreshed.
#[test]
fn rollback_requires_stale_global_pk() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let m = scalars((1..=16).map(|i| 10 * i));
    let (id, header, secrets) = sys.owner.create_batch_single(&m, &ones(N), &mut rng).unwrap();
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    // Proof generated against the pre-revocation state.
    let f_old = sys.owner.global_pk().f_current;
    let challenge = ones(N);
    let proof = sys.server.generate_dc_data_proof(&id, &challenge, &f_old, 0).unwrap();

    // The owner revokes; the server mirrors; the verifier does NOT update.
    let rev = sys.owner.revoke_batch(&header.sigma).unwrap();
    sys.server.add_server_key(rev.server_key);
    sys.server.add_revoked_item(rev.sigma_bytes.clone());

    // Stale verifier: the old proof still passes (the rollback window).
    assert!(sys
        .verifier
        .verify_dc_query(&header, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());

    // Refreshed verifier: the same proof now fails at the pre-check.
    sys.verifier.update_global_pk(rev.global_pk.clone());
    assert!(!sys
        .verifier
        .verify_dc_query(&header, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());

    // And a fresh proof for the revoked batch carries the dummy witness,
    // which also fails cleanly.
    let fresh = sys
        .server
        .generate_dc_data_proof(&id, &challenge, &rev.global_pk.f_current, 0)
        .unwrap();
    assert!(!sys
        .verifier
        .verify_dc_query(&header, &challenge, &fresh.x, &fresh.pi, &fresh.witness, 0)
        .unwrap());
}

/// Mix-and-match: a header assembled from two batches fails the binding
/// signature pre-check.
#[test]
fn mixed_headers_are_rejected() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let m1 = scalars(1..=16);
    let m2 = scalars(17..=32);
    let (id1, header1, secrets1) = sys.owner.create_batch_single(&m1, &ones(N), &mut rng).unwrap();
    let (_, header2, _) = sys.owner.create_batch_single(&m2, &ones(N), &mut rng).unwrap();
    sys.server.store_batch(&id1, header1.clone(), secrets1).unwrap();

    let f = sys.owner.global_pk().f_current;
    let challenge = ones(N);
    let proof = sys.server.generate_dc_data_proof(&id1, &challenge, &f, 0).unwrap();

    // Data commitments from batch 1, time commitment from batch 2,
    // signature from batch 1: rejected before any pairing check runs.
    let franken = BatchHeader {
        c_data_list: header1.c_data_list.clone(),
        c_time: header2.c_time,
        sigma: header1.sigma.clone(),
    };
    assert!(!sys
        .verifier
        .verify_dc_query(&franken, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());

    // Same with the other batch's signature.
    let franken = BatchHeader {
        c_data_list: header1.c_data_list.clone(),
        c_time: header2.c_time,
        sigma: header2.sigma.clone(),
    };
    assert!(!sys
        .verifier
        .verify_dc_query(&franken, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());
}

/// Data tampering: the server silently rewrites one stored entry; the
/// aggregated-opening equation catches it.
#[test]
fn tampered_secret_store_fails_verification() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let m = scalars((1..=16).map(|i| 10 * i));
    let (id, header, mut secrets) = sys.owner.create_batch_single(&m, &ones(N), &mut rng).unwrap();
    // m[2] := 31 instead of 30 inside the server's copy.
    secrets.m_matrix[0][2] = F::from(31u64);
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    let f = sys.owner.global_pk().f_current;
    let challenge = ones(N);
    let proof = sys.server.generate_dc_data_proof(&id, &challenge, &f, 0).unwrap();
    assert!(!sys
        .verifier
        .verify_dc_query(&header, &challenge, &proof.x, &proof.pi, &proof.witness, 0)
        .unwrap());
}

/// Multi-column batch: three sensor columns verify independently, each with
/// its own result; an out-of-range column is a typed error on both roles.
#[test]
fn multi_column_batches_verify_per_column() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let temperature = scalars((0..16).map(|i| 20 + i));
    let humidity = scalars((0..16).map(|i| 50 + i));
    let pressure = scalars((0..16).map(|i| 1000 + i));
    let matrix = vec![temperature.clone(), humidity.clone(), pressure.clone()];

    let (id, header, secrets) = sys.owner.create_batch(&matrix, &ones(N), &mut rng).unwrap();
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    let f = sys.owner.global_pk().f_current;
    let challenge = ones(N);
    let mut results = Vec::new();
    for col in 0..3 {
        let proof = sys.server.generate_dc_data_proof(&id, &challenge, &f, col).unwrap();
        assert!(sys
            .verifier
            .verify_dc_query(&header, &challenge, &proof.x, &proof.pi, &proof.witness, col)
            .unwrap());
        results.push(proof.x);
    }
    let sum = |v: &[F]| -> F { v.iter().sum() };
    assert_eq!(results, vec![sum(&temperature), sum(&humidity), sum(&pressure)]);

    assert!(matches!(
        sys.server.generate_dc_data_proof(&id, &challenge, &f, 3),
        Err(ServerError::ColumnOutOfRange { index: 3, count: 3 })
    ));
    let p = sys.server.generate_dc_data_proof(&id, &challenge, &f, 0).unwrap();
    assert!(matches!(
        sys.verifier.verify_dc_query(&header, &challenge, &p.x, &p.pi, &p.witness, 3),
        Err(VerifierError::ColumnOutOfRange { index: 3, count: 3 })
    ));
}

/// Time range proofs at ℓ = 32: in-range time values verify; a value at
/// 2^32 makes the generator refuse.
#[test]
fn time_range_proofs_round_trip() {
    let mut rng = rng();
    // ℓ = 32 requires dimension ≥ 32.
    let mut sys = system(32, &mut rng);

    let m = scalars(0..32);
    let t_vec = scalars((0..32).map(|i| 20 + i));
    let (id, header, secrets) = sys.owner.create_batch_single(&m, &t_vec, &mut rng).unwrap();
    sys.server.store_batch(&id, header.clone(), secrets).unwrap();

    let f = sys.owner.global_pk().f_current;
    let proofs = sys.server.generate_time_range_proofs(&id, &f, &mut rng).unwrap();
    assert_eq!(proofs.len(), 32);
    for proof in &proofs {
        assert!(sys.verifier.verify_time_range_proof(&header, proof, &f).unwrap());
    }

    // A batch whose time vector contains 2^32 is refused outright.
    let mut t_bad = t_vec.clone();
    t_bad[0] = F::from(1u64 << 32);
    let (id2, header2, secrets2) = sys.owner.create_batch_single(&m, &t_bad, &mut rng).unwrap();
    sys.server.store_batch(&id2, header2, secrets2).unwrap();
    assert!(matches!(
        sys.server.generate_time_range_proofs(&id2, &f, &mut rng),
        Err(ServerError::Proof(_))
    ));
}

/// Batch update: the old id disappears from the server, the refreshed
/// verifier rejects any stale proof for it, and the new batch verifies.
#[test]
fn update_batch_retires_the_old_id() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let (old_id, old_header, old_secrets) = sys
        .owner
        .create_batch_single(&scalars((0..16).map(|i| 10 + i)), &ones(N), &mut rng)
        .unwrap();
    sys.server.store_batch(&old_id, old_header.clone(), old_secrets).unwrap();

    let challenge = ones(N);
    let f_old = sys.owner.global_pk().f_current;
    let stale = sys.server.generate_dc_data_proof(&old_id, &challenge, &f_old, 0).unwrap();

    let upd = sys
        .owner
        .update_batch(
            &old_header,
            &[scalars((0..16).map(|i| 20 + i))],
            &scalars((0..16).map(|i| 11 + i)),
            &mut rng,
        )
        .unwrap();
    sys.server
        .update_batch(
            &old_id,
            upd.revocation.server_key,
            upd.revocation.sigma_bytes.clone(),
            &upd.batch_id,
            upd.header.clone(),
            upd.secrets.clone(),
        )
        .unwrap();
    sys.verifier.update_global_pk(upd.revocation.global_pk.clone());

    // The old batch is gone from the server…
    assert!(matches!(
        sys.server
            .generate_dc_data_proof(&old_id, &challenge, &upd.revocation.global_pk.f_current, 0),
        Err(ServerError::BatchNotFound(_))
    ));
    // …and the stale proof fails at the refreshed verifier.
    assert!(!sys
        .verifier
        .verify_dc_query(&old_header, &challenge, &stale.x, &stale.pi, &stale.witness, 0)
        .unwrap());

    // The replacement verifies normally.
    let fresh = sys
        .server
        .generate_dc_data_proof(&upd.batch_id, &challenge, &upd.revocation.global_pk.f_current, 0)
        .unwrap();
    assert!(sys
        .verifier
        .verify_dc_query(&upd.header, &challenge, &fresh.x, &fresh.pi, &fresh.witness, 0)
        .unwrap());
}

/// Several revocations in sequence keep the accumulator sound for the
/// surviving batches.
#[test]
fn surviving_batches_verify_after_multiple_revocations() {
    let mut rng = rng();
    let mut sys = system(N, &mut rng);

    let mut batches = Vec::new();
    for k in 0..3u64 {
        let (id, header, secrets) = sys
            .owner
            .create_batch_single(&scalars((0..16).map(|i| 100 * k + i)), &ones(N), &mut rng)
            .unwrap();
        sys.server.store_batch(&id, header.clone(), secrets).unwrap();
        batches.push((id, header));
    }

    // Revoke the first two.
    for (_, header) in &batches[..2] {
        let rev = sys.owner.revoke_batch(&header.sigma).unwrap();
        sys.server.add_server_key(rev.server_key);
        sys.server.add_revoked_item(rev.sigma_bytes.clone());
        sys.verifier.update_global_pk(rev.global_pk.clone());
    }

    let f = sys.owner.global_pk().f_current;
    let challenge = ones(N);

    // Revoked batches fail.
    for (id, header) in &batches[..2] {
        let p = sys.server.generate_dc_data_proof(id, &challenge, &f, 0).unwrap();
        assert!(!sys
            .verifier
            .verify_dc_query(header, &challenge, &p.x, &p.pi, &p.witness, 0)
            .unwrap());
    }
    // The survivor still verifies.
    let (id, header) = &batches[2];
    let p = sys.server.generate_dc_data_proof(id, &challenge, &f, 0).unwrap();
    assert!(sys
        .verifier
        .verify_dc_query(header, &challenge, &p.x, &p.pi, &p.witness, 0)
        .unwrap());
}
