// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct EchoResolver;

#[async_trait]
impl ArtifactResolver for EchoResolver {
    async fn resolve(&self, uris: &BTreeSet<String>) -> Result<Vec<ResolvedArtifact>, RunnerError> {
        Ok(uris
            .iter()
            .map(|u| ResolvedArtifact::new(u.clone(), format!("/tmp/{}", u.replace(':', "_"))))
            .collect())
    }
}

#[tokio::test]
async fn trait_object_resolves_each_uri() {
    let resolver: std::sync::Arc<dyn ArtifactResolver> = std::sync::Arc::new(EchoResolver);
    let mut uris = BTreeSet::new();
    uris.insert("mvn:g:a:1".to_string());
    let resolved = resolver.resolve(&uris).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].uri, "mvn:g:a:1");
}
