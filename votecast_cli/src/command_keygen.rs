use super::expand;

pub fn command_keygen(matches: &clap::ArgMatches) {
    // Unwrap is safe, SECRET_FILE is required
    let filename = expand(matches.value_of("SECRET_FILE").unwrap());

    let (secret, public) = votecast::generate_keypair();
    let (secret, public) = (
        hex::encode(secret.to_bytes()),
        hex::encode(public.to_bytes()),
    );

    if let Err(e) = std::fs::write(&filename, format!("{}\n", secret)) {
        eprintln!("votecast keygen: unable to write {}: {}", filename, e);
        std::process::exit(1);
    }

    println!("public-key: {}", public);
}
