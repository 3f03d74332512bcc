//! Round trips across every algorithm, key size and option combination.

use symcrypt_core::{
    decrypt, encrypt, random_bytes, Algorithm, CryptoError, Cryptor, KeySizes, Mode, Operation,
    Options, Padding, Software, StatusCode,
};

/// Key lengths worth exercising for `alg` that the provider implements.
fn key_lengths(alg: Algorithm) -> Vec<usize> {
    let candidates = match alg.key_sizes() {
        KeySizes::Fixed(sizes) => sizes.to_vec(),
        KeySizes::Range { min, max } => vec![min, 5, 16, (min + max) / 2, 32, 64, max],
    };
    let mut lens: Vec<usize> = candidates
        .into_iter()
        .filter(|&len| Software::accepts_key(alg, len))
        .collect();
    lens.sort_unstable();
    lens.dedup();
    lens
}

fn option_sets() -> [Options; 4] {
    [
        Options::empty(),
        Options::PKCS7_PADDING,
        Options::ECB_MODE,
        Options::PKCS7_PADDING | Options::ECB_MODE,
    ]
}

/// Plaintext lengths legal for `options`: any length with padding or on a
/// stream cipher, whole blocks otherwise.
fn plaintext_lengths(alg: Algorithm, options: Options) -> Vec<usize> {
    let bs = alg.block_size();
    if alg.is_stream() || options.contains(Options::PKCS7_PADDING) {
        vec![0, 1, 15, 16, 17, 997]
    } else {
        vec![0, bs, 4 * bs, 64 * bs]
    }
}

#[test]
fn every_combination_round_trips() {
    for alg in Algorithm::ALL {
        for key_len in key_lengths(alg) {
            let key = random_bytes(&Software, key_len).expect("random key");
            for options in option_sets() {
                let iv = alg.random_iv(&Software).expect("random iv");
                for len in plaintext_lengths(alg, options) {
                    let plaintext = random_bytes(&Software, len).expect("random plaintext");
                    let ciphertext =
                        encrypt(&Software, alg, options, &key, iv.as_deref(), &plaintext)
                            .unwrap_or_else(|e| panic!("{alg:?}/{key_len}/{options:?}/{len}: {e}"));
                    let decrypted =
                        decrypt(&Software, alg, options, &key, iv.as_deref(), &ciphertext)
                            .unwrap_or_else(|e| panic!("{alg:?}/{key_len}/{options:?}/{len}: {e}"));
                    assert_eq!(decrypted, plaintext, "{alg:?}/{key_len}/{options:?}/{len}");
                }
            }
        }
    }
}

fn mode_cryptor(
    operation: Operation,
    mode: Mode,
    alg: Algorithm,
    key: &[u8],
    iv: Option<&[u8]>,
) -> Cryptor<'static, Software> {
    Cryptor::with_mode(&Software, operation, mode, alg, Padding::Pkcs7, key, iv, &[], 0)
        .unwrap_or_else(|e| panic!("{alg:?}/{mode:?}: {e}"))
}

#[test]
fn every_block_cipher_round_trips_in_every_mode() {
    let modes = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Cfb8, Mode::Ctr, Mode::Ofb];
    for alg in Algorithm::ALL.into_iter().filter(|alg| !alg.is_stream()) {
        let key = random_bytes(&Software, key_lengths(alg)[0]).expect("random key");
        let iv = alg.random_iv(&Software).expect("random iv");
        for mode in modes {
            for len in [0, 1, 15, 16, 17, 333] {
                let plaintext = random_bytes(&Software, len).expect("random plaintext");
                let mut enc = mode_cryptor(Operation::Encrypt, mode, alg, &key, iv.as_deref());
                let ciphertext = enc
                    .process(&plaintext)
                    .unwrap_or_else(|e| panic!("{alg:?}/{mode:?}/{len}: {e}"));
                if !mode.is_block_aligned() {
                    assert_eq!(ciphertext.len(), len, "{alg:?}/{mode:?}");
                }
                let mut dec = mode_cryptor(Operation::Decrypt, mode, alg, &key, iv.as_deref());
                let decrypted = dec
                    .process(&ciphertext)
                    .unwrap_or_else(|e| panic!("{alg:?}/{mode:?}/{len}: {e}"));
                assert_eq!(decrypted, plaintext, "{alg:?}/{mode:?}/{len}");
            }
        }
    }
}

#[test]
fn rc4_runs_only_in_its_own_mode() {
    let key = [0x44u8; 16];
    let mut enc = mode_cryptor(Operation::Encrypt, Mode::Rc4, Algorithm::Rc4, &key, None);
    let via_mode = enc.process(b"Plaintext").expect("process should succeed");
    let via_options = encrypt(&Software, Algorithm::Rc4, Options::empty(), &key, None, b"Plaintext")
        .expect("one-shot should succeed");
    assert_eq!(via_mode, via_options);

    for mode in [Mode::Cbc, Mode::Ctr] {
        let result = Cryptor::with_mode(
            &Software,
            Operation::Encrypt,
            mode,
            Algorithm::Rc4,
            Padding::None,
            &key,
            None,
            &[],
            0,
        );
        assert!(matches!(
            result,
            Err(CryptoError::ContextCreation(StatusCode::ParameterError))
        ));
    }
}

#[test]
fn streaming_matches_one_shot_for_every_algorithm() {
    let plaintext = random_bytes(&Software, 997).expect("random plaintext");
    for alg in Algorithm::ALL {
        let key = vec![0x3Eu8; key_lengths(alg)[0]];
        let mut cryptor = Cryptor::new(
            &Software,
            Operation::Encrypt,
            alg,
            Options::PKCS7_PADDING,
            &key,
            None,
        )
        .expect("cryptor creation should succeed");
        let mut streamed = Vec::new();
        for chunk in plaintext.chunks(61) {
            streamed.extend(cryptor.update(chunk).expect("update should succeed"));
        }
        streamed.extend(cryptor.finalize().expect("finalize should succeed"));

        let one_shot = encrypt(&Software, alg, Options::PKCS7_PADDING, &key, None, &plaintext)
            .expect("one-shot should succeed");
        assert_eq!(streamed, one_shot, "{alg:?}");
    }
}

#[test]
fn aes256_padded_997_bytes_without_iv() {
    let key = random_bytes(&Software, 32).expect("random key");
    let plaintext = random_bytes(&Software, 997).expect("random plaintext");

    let ciphertext = encrypt(
        &Software,
        Algorithm::Aes,
        Options::PKCS7_PADDING,
        &key,
        None,
        &plaintext,
    )
    .expect("encryption should succeed");
    assert_eq!(ciphertext.len() % Algorithm::Aes.block_size(), 0);
    assert!(ciphertext.len() > 997);

    let decrypted = decrypt(
        &Software,
        Algorithm::Aes,
        Options::PKCS7_PADDING,
        &key,
        None,
        &ciphertext,
    )
    .expect("decryption should succeed");
    assert_eq!(decrypted.len(), 997);
    assert_eq!(decrypted, plaintext);
}

#[test]
fn empty_key_is_rejected_everywhere() {
    for alg in Algorithm::ALL {
        let one_shot = encrypt(&Software, alg, Options::PKCS7_PADDING, &[], None, &[]);
        assert_eq!(
            one_shot,
            Err(CryptoError::Status(StatusCode::ParameterError)),
            "{alg:?}"
        );

        let streaming = Cryptor::new(
            &Software,
            Operation::Encrypt,
            alg,
            Options::PKCS7_PADDING,
            &[],
            None,
        );
        assert!(
            matches!(
                streaming,
                Err(CryptoError::ContextCreation(StatusCode::ParameterError))
            ),
            "{alg:?}"
        );
    }
}

#[test]
fn out_of_range_keys_are_rejected() {
    for alg in Algorithm::ALL {
        let too_long = vec![1u8; alg.key_sizes().max() + 1];
        let err = encrypt(&Software, alg, Options::PKCS7_PADDING, &too_long, None, b"x")
            .expect_err("oversized key must fail");
        assert_eq!(err.status(), Some(StatusCode::ParameterError), "{alg:?}");
    }
}

#[test]
fn different_ivs_give_different_ciphertext() {
    let key = [0x21u8; 16];
    let a = encrypt(
        &Software,
        Algorithm::Aes,
        Options::PKCS7_PADDING,
        &key,
        Some(&[1u8; 16]),
        b"same message",
    )
    .expect("encryption should succeed");
    let b = encrypt(
        &Software,
        Algorithm::Aes,
        Options::PKCS7_PADDING,
        &key,
        Some(&[2u8; 16]),
        b"same message",
    )
    .expect("encryption should succeed");
    assert_ne!(a, b);
}

#[test]
fn hosted_cryptors_work_for_every_algorithm() {
    for alg in Algorithm::ALL {
        let key = vec![0x6Du8; alg.key_sizes().max().min(256)];
        let mut memory = Vec::new();
        let ciphertext = {
            let mut cryptor = Cryptor::with_memory(
                &Software,
                Operation::Encrypt,
                alg,
                Options::PKCS7_PADDING,
                &key,
                None,
                &mut memory,
            )
            .unwrap_or_else(|e| panic!("{alg:?}: {e}"));
            cryptor.process(b"hosted in caller memory").expect("process should succeed")
        };
        assert!(memory.is_empty(), "{alg:?} memory must be emptied on drop");

        let plaintext = decrypt(&Software, alg, Options::PKCS7_PADDING, &key, None, &ciphertext)
            .expect("decryption should succeed");
        assert_eq!(plaintext, b"hosted in caller memory", "{alg:?}");
    }
}
