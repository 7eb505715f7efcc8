use serde::{Deserialize, Serialize};

use super::dependencies::import_sources;
use super::TreeAnalyzer;
use crate::report::CloudServiceUsage;
use crate::syntax::SyntaxTree;

/// One row of the vendor table: an import-source substring and what it
/// indicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub pattern: String,
    pub provider: String,
    pub service: String,
    pub usage: String,
}

struct BuiltinVendor {
    pattern: &'static str,
    provider: &'static str,
    service: &'static str,
    usage: &'static str,
}

static BUILTIN_VENDORS: &[BuiltinVendor] = &[
    BuiltinVendor { pattern: "aws-sdk", provider: "AWS", service: "AWS SDK", usage: "General AWS services" },
    BuiltinVendor { pattern: "firebase", provider: "Google Cloud", service: "Firebase", usage: "Firebase services" },
    BuiltinVendor { pattern: "supabase", provider: "Supabase", service: "Supabase Client", usage: "Database and auth services" },
    BuiltinVendor { pattern: "@google-cloud/", provider: "Google Cloud", service: "Google Cloud Client", usage: "Google Cloud Platform services" },
    BuiltinVendor { pattern: "@azure/", provider: "Azure", service: "Azure SDK", usage: "General Azure services" },
];

/// Ordered, read-only vendor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorTable {
    vendors: Vec<Vendor>,
}

impl VendorTable {
    pub fn builtin() -> Self {
        Self::with_extra(Vec::new())
    }

    /// Built-in vendors followed by `extra`, in that order.
    pub fn with_extra(extra: Vec<Vendor>) -> Self {
        let mut vendors: Vec<Vendor> = BUILTIN_VENDORS
            .iter()
            .map(|v| Vendor {
                pattern: v.pattern.to_string(),
                provider: v.provider.to_string(),
                service: v.service.to_string(),
                usage: v.usage.to_string(),
            })
            .collect();
        vendors.extend(extra);
        Self { vendors }
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }
}

impl Default for VendorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

pub struct CloudAnalyzer {
    table: VendorTable,
}

impl CloudAnalyzer {
    pub fn new(table: VendorTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VendorTable {
        &self.table
    }

    /// Vendor-table order first, then document order.  Every matching import
    /// produces a usage, duplicates included.
    pub fn detect(&self, tree: &SyntaxTree) -> Vec<CloudServiceUsage> {
        let imports = import_sources(tree);
        let mut out = Vec::new();
        for vendor in &self.table.vendors {
            for import in imports.iter().filter(|i| i.source.contains(&vendor.pattern)) {
                out.push(CloudServiceUsage {
                    provider: vendor.provider.clone(),
                    service: vendor.service.clone(),
                    usage: vendor.usage.clone(),
                    line: import.line,
                });
            }
        }
        out
    }
}

impl Default for CloudAnalyzer {
    fn default() -> Self {
        Self::new(VendorTable::builtin())
    }
}

impl TreeAnalyzer for CloudAnalyzer {
    type Output = Vec<CloudServiceUsage>;

    fn name(&self) -> &'static str {
        "cloud"
    }

    fn analyze(&self, tree: &SyntaxTree, _source: &str) -> Vec<CloudServiceUsage> {
        self.detect(tree)
    }
}

/// Match import sources against the built-in vendor table.
pub fn detect_cloud_services(tree: &SyntaxTree) -> Vec<CloudServiceUsage> {
    CloudAnalyzer::default().detect(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::syntax::parse;

    fn providers(usages: &[CloudServiceUsage]) -> Vec<(&str, usize)> {
        usages.iter().map(|u| (u.provider.as_str(), u.line)).collect()
    }

    #[test]
    fn vendor_order_then_document_order() {
        let source = "\
import { createClient } from '@supabase/supabase-js';
const S3 = require('aws-sdk/clients/s3');
import firebase from 'firebase/app';
const { DynamoDB } = require('aws-sdk');
";
        let tree = parse(source, Language::JavaScript).unwrap();
        let usages = detect_cloud_services(&tree);
        assert_eq!(
            providers(&usages),
            vec![("AWS", 2), ("AWS", 4), ("Google Cloud", 3), ("Supabase", 1)]
        );
        assert_eq!(usages[2].service, "Firebase");
    }

    #[test]
    fn configured_vendors_follow_builtins() {
        let source = "import { put } from '@vercel/blob';\nimport { BlobServiceClient } from '@azure/storage-blob';";
        let tree = parse(source, Language::JavaScript).unwrap();
        let table = VendorTable::with_extra(vec![Vendor {
            pattern: "@vercel/".into(),
            provider: "Vercel".into(),
            service: "Vercel SDK".into(),
            usage: "Edge and storage APIs".into(),
        }]);
        let usages = CloudAnalyzer::new(table).detect(&tree);
        assert_eq!(providers(&usages), vec![("Azure", 2), ("Vercel", 1)]);
    }

    #[test]
    fn no_vendor_imports_means_no_usages() {
        let tree = parse("import React from 'react';", Language::JavaScript).unwrap();
        assert!(detect_cloud_services(&tree).is_empty());
    }
}
