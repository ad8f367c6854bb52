//! Sieve of Eratosthenes with the harmonic-set convention.

/// Primality flags for the integers `0..=n`; `flags[h]` answers "does
/// harmonic `h` contribute".
///
/// Index 1 is forced true: the fundamental always participates in the
/// kernel even though 1 is not prime. Index 0 is never a harmonic and stays
/// false.
pub fn prime_flags(n: usize) -> Vec<bool> {
    let mut flags = vec![true; n + 1];
    flags[0] = false;
    let mut p = 2usize;
    while p * p <= n {
        if flags[p] {
            let mut m = p * p;
            while m <= n {
                flags[m] = false;
                m += p;
            }
        }
        p += 1;
    }
    flags
}
