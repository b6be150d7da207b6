use std::{fs, path::Path, process::Command, time::SystemTime};

fn main() {
  let now = SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or(0);
  println!("cargo:rustc-env=BUILD_TIME={}", now);

  println!("cargo:rerun-if-changed=.git/HEAD");
  if Path::new(".git/refs/heads").exists() {
    println!("cargo:rerun-if-changed=.git/refs/heads");
  }

  let (branch, commit) = git_info();
  let short: String = commit.chars().take(7).collect();

  println!("cargo:rustc-env=GIT_BRANCH={}", branch);
  println!("cargo:rustc-env=GIT_COMMIT={}", commit);
  println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", short);
}

fn git(args: &[&str]) -> Option<String> {
  let output = Command::new("git").args(args).output().ok()?;
  if !output.status.success() {
    return None;
  }
  let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!text.is_empty()).then_some(text)
}

fn git_info() -> (String, String) {
  let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"]);
  let commit = git(&["rev-parse", "HEAD"]);

  if let (Some(branch), Some(commit)) = (branch.clone(), commit.clone()) {
    return (branch, commit);
  }

  // No git binary: fall back to reading .git directly.
  let mut fallback = (
    branch.unwrap_or_else(|| "unknown".to_string()),
    commit.unwrap_or_else(|| "unknown".to_string()),
  );
  if let Ok(head) = fs::read_to_string(".git/HEAD") {
    if let Some(ref_path) = head.strip_prefix("ref: ") {
      let ref_path = ref_path.trim();
      fallback.0 = ref_path.rsplit('/').next().unwrap_or("unknown").to_string();
      if let Ok(commit) = fs::read_to_string(format!(".git/{}", ref_path)) {
        fallback.1 = commit.trim().to_string();
      }
    } else {
      fallback.1 = head.trim().to_string();
    }
  }
  fallback
}
