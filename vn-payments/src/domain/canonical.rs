use std::collections::BTreeMap;

// 扁平的参数表，键按字节序排列
pub type ParamMap = BTreeMap<String, String>;

// 参数排列顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    // 只按固定列表输出，列表外的键一律丢弃
    Fixed(&'static [&'static str]),
    // 按键的字节序升序输出
    Sorted,
}

// 参与签名的键前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixFilter {
    All,
    Prefixes(&'static [&'static str]),
}

impl PrefixFilter {
    pub fn allows(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Prefixes(prefixes) => prefixes.iter().any(|prefix| key.starts_with(prefix)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalPolicy {
    pub key_order: KeyOrder,
    pub prefixes: PrefixFilter,
}

impl CanonicalPolicy {
    pub const fn fixed(keys: &'static [&'static str], prefixes: PrefixFilter) -> Self {
        Self {
            key_order: KeyOrder::Fixed(keys),
            prefixes,
        }
    }

    pub const fn sorted(prefixes: PrefixFilter) -> Self {
        Self {
            key_order: KeyOrder::Sorted,
            prefixes,
        }
    }
}

/// 待签名的有序参数集合。
///
/// 不含空值；相同的输入和策略总是得到相同的顺序，签名和验签依赖这一点。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalParams(Vec<(String, String)>);

impl CanonicalParams {
    pub fn build(params: &ParamMap, policy: &CanonicalPolicy) -> Self {
        Self(
            ordered_entries(params, &policy.key_order)
                .into_iter()
                .filter(|(key, _)| policy.prefixes.allows(key))
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    // 按同样顺序取出不参与签名的字段（如 Title、AgainLink）
    pub fn unsigned(params: &ParamMap, policy: &CanonicalPolicy) -> Vec<(String, String)> {
        ordered_entries(params, &policy.key_order)
            .into_iter()
            .filter(|(key, _)| !policy.prefixes.allows(key))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    // key=value 以 & 连接，值不做 URL 编码
    pub fn to_canonical_string(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn canonicalize(params: &ParamMap, policy: &CanonicalPolicy) -> String {
    CanonicalParams::build(params, policy).to_canonical_string()
}

fn ordered_entries<'a>(params: &'a ParamMap, key_order: &KeyOrder) -> Vec<(&'a str, &'a str)> {
    let entries: Vec<(&'a String, &'a String)> = match *key_order {
        KeyOrder::Fixed(keys) => keys
            .iter()
            .filter_map(|key| params.get_key_value(*key))
            .collect(),
        KeyOrder::Sorted => params.iter().collect(),
    };

    entries
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const VPC: PrefixFilter = PrefixFilter::Prefixes(&["vpc_", "user_"]);

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fixed_order_drops_unlisted_keys() {
        let policy = CanonicalPolicy::fixed(&["vpc_B", "vpc_A"], VPC);
        let input = params(&[("vpc_A", "1"), ("vpc_B", "2"), ("vpc_C", "3")]);

        assert_eq!(canonicalize(&input, &policy), "vpc_B=2&vpc_A=1");
    }

    #[test]
    fn sorted_order_is_bytewise() {
        let policy = CanonicalPolicy::sorted(PrefixFilter::All);
        let input = params(&[("b", "2"), ("B", "1"), ("a", "3"), ("_x", "4")]);

        assert_eq!(canonicalize(&input, &policy), "B=1&_x=4&a=3&b=2");
    }

    #[rstest]
    #[case(&[("vpc_Amount", "")], "")]
    #[case(&[("vpc_Amount", "100"), ("vpc_Locale", "")], "vpc_Amount=100")]
    #[case(&[("Title", "shop"), ("vpc_Amount", "100")], "vpc_Amount=100")]
    #[case(&[("user_Note", "a b"), ("vpc_Amount", "100")], "user_Note=a b&vpc_Amount=100")]
    fn filters_empty_values_and_prefixes(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        let policy = CanonicalPolicy::sorted(VPC);
        assert_eq!(canonicalize(&params(pairs), &policy), expected);
    }

    #[test]
    fn unsigned_fields_keep_policy_order() {
        let policy = CanonicalPolicy::fixed(&["AgainLink", "Title", "vpc_Amount"], VPC);
        let input = params(&[("Title", "shop"), ("AgainLink", "http://a"), ("vpc_Amount", "1")]);

        let unsigned = CanonicalParams::unsigned(&input, &policy);
        assert_eq!(
            unsigned,
            vec![
                ("AgainLink".to_string(), "http://a".to_string()),
                ("Title".to_string(), "shop".to_string()),
            ]
        );

        let signed = CanonicalParams::build(&input, &policy);
        assert_eq!(signed.len(), 1);
        assert_eq!(signed.get("vpc_Amount"), Some("1"));
    }

    #[test]
    fn canonicalization_is_deterministic() {
        let policy = CanonicalPolicy::sorted(PrefixFilter::Prefixes(&["vnp_"]));
        let input = params(&[("vnp_TxnRef", "x"), ("vnp_Amount", "100"), ("other", "y")]);

        let first = canonicalize(&input, &policy);
        let second = canonicalize(&input.clone(), &policy);
        assert_eq!(first, second);
        assert_eq!(first, "vnp_Amount=100&vnp_TxnRef=x");
    }
}
